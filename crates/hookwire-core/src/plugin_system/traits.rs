use std::fmt;
use std::sync::Arc;

use crate::plugin_system::identity::ExecutionEnvironment;

/// Error a feature module reports from [`FeatureModule::activate`]
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// A class, method or resource the module patches is missing from the
    /// plugin's environment (typically a newer or older plugin build)
    #[error("Target not found: {target}")]
    TargetNotFound { target: String },

    /// The module inspected the environment and declined to apply itself
    #[error("Activation rejected: {message}")]
    Rejected { message: String },

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ModuleError {
    pub fn target_not_found(target: impl Into<String>) -> Self {
        ModuleError::TargetNotFound {
            target: target.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        ModuleError::Rejected {
            message: message.into(),
        }
    }
}

/// Result of a single module activation
pub type ActivationResult = std::result::Result<(), ModuleError>;

/// Activation contract every feature module satisfies.
///
/// `activate` is called at most once per qualifying plugin load. The
/// environment reference is only valid for the duration of the call; modules
/// must not stash it.
pub trait FeatureModule: Send + Sync {
    /// Name used in logs and dispatch reports
    fn name(&self) -> &str;

    /// Apply this module's behavior change to the plugin environment
    fn activate(&self, environment: &ExecutionEnvironment) -> ActivationResult;
}

impl fmt::Debug for dyn FeatureModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureModule").field("name", &self.name()).finish_non_exhaustive()
    }
}

/// Closure-backed module, handy for hosts wiring existing functions and for tests
pub struct FnModule {
    name: String,
    activate: Box<dyn Fn(&ExecutionEnvironment) -> ActivationResult + Send + Sync>,
}

impl fmt::Debug for FnModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnModule")
            .field("name", &self.name)
            .field("activate", &"<closure>")
            .finish()
    }
}

impl FeatureModule for FnModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn activate(&self, environment: &ExecutionEnvironment) -> ActivationResult {
        (self.activate)(environment)
    }
}

/// Wrap a closure as a shareable [`FeatureModule`]
pub fn module_fn<F>(name: impl Into<String>, activate: F) -> Arc<dyn FeatureModule>
where
    F: Fn(&ExecutionEnvironment) -> ActivationResult + Send + Sync + 'static,
{
    Arc::new(FnModule {
        name: name.into(),
        activate: Box::new(activate),
    })
}
