use std::fmt;
use std::sync::{Arc, Weak};

use crate::plugin_system::identity::{self, ExecutionEnvironment, PluginFactory};

/// One host plugin load, as seen by the dispatcher.
///
/// Built by the hook adapter when the host signals plugin creation and dropped
/// once the dispatch pass completes. The environment handle is non-owning: it
/// is upgraded once per pass and never stored anywhere else.
#[derive(Clone)]
pub struct PluginEvent {
    identity_key: String,
    environment: Weak<ExecutionEnvironment>,
}

impl PluginEvent {
    pub fn new(identity_key: impl Into<String>, environment: Weak<ExecutionEnvironment>) -> Self {
        Self {
            identity_key: identity_key.into(),
            environment,
        }
    }

    /// Resolve the identity from the host's factory object
    pub fn from_factory(factory: &dyn PluginFactory, environment: Weak<ExecutionEnvironment>) -> Self {
        Self::new(identity::identity_key(factory), environment)
    }

    /// Declared component class name, empty when unknown
    pub fn identity_key(&self) -> &str {
        &self.identity_key
    }

    pub fn resolve_environment(&self) -> Option<Arc<ExecutionEnvironment>> {
        identity::resolve_environment(&self.environment)
    }
}

impl fmt::Debug for PluginEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginEvent")
            .field("identity_key", &self.identity_key)
            .field("environment_alive", &(self.environment.strong_count() > 0))
            .finish()
    }
}
