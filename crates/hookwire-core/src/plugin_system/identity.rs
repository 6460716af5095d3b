//! Plugin identity resolution.
//!
//! A plugin is identified by the class name of its declared component. The
//! execution environment it was loaded into belongs to the host and is only
//! observed through a [`Weak`] reference, so it can disappear at any time.
use std::fmt;
use std::sync::{Arc, Weak};

/// Package/class pair naming a plugin component
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentName {
    package: String,
    class: String,
}

impl ComponentName {
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            class: class.into(),
        }
    }

    /// Parse the flattened `package/class` form. A class starting with `.` is
    /// relative to the package. Returns `None` when either half is missing.
    pub fn parse(flat: &str) -> Option<Self> {
        let (package, class) = flat.split_once('/')?;
        if package.is_empty() || class.is_empty() {
            return None;
        }
        let class = if class.starts_with('.') {
            format!("{}{}", package, class)
        } else {
            class.to_string()
        };
        Some(Self::new(package, class))
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn class_name(&self) -> &str {
        &self.class
    }

    pub fn flatten(&self) -> String {
        format!("{}/{}", self.package, self.class)
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.class)
    }
}

/// Host-side factory/descriptor object that created the plugin
pub trait PluginFactory: Send + Sync {
    /// Declared component of the plugin, `None` if the host did not record one
    fn component_name(&self) -> Option<ComponentName>;
}

impl PluginFactory for ComponentName {
    fn component_name(&self) -> Option<ComponentName> {
        Some(self.clone())
    }
}

/// Loading scope of one plugin instance: the context feature modules patch.
///
/// Owned by the host. The core only ever holds it for the duration of a
/// dispatch pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionEnvironment {
    package: String,
    loader: String,
}

impl ExecutionEnvironment {
    pub fn new(package: impl Into<String>, loader: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            loader: loader.into(),
        }
    }

    /// Package the plugin was loaded from
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Description of the class loader backing this environment
    pub fn loader(&self) -> &str {
        &self.loader
    }
}

/// Stable identity key for a factory: its component's class name, or the
/// empty string when the host cannot tell. Recomputed on every call.
pub fn identity_key(factory: &dyn PluginFactory) -> String {
    factory
        .component_name()
        .map(|name| name.class_name().to_string())
        .unwrap_or_default()
}

/// Dereference a weak environment handle. `None` means the host already
/// dropped or recreated the plugin context.
pub fn resolve_environment(handle: &Weak<ExecutionEnvironment>) -> Option<Arc<ExecutionEnvironment>> {
    handle.upgrade()
}
