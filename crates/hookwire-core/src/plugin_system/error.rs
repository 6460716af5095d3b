//! # Hookwire Plugin System Errors
//!
//! Defines [`PluginSystemError`], covering every failure the dispatch path can
//! observe: host-call extraction, hook installation and module activation.
//! None of these ever reach the host; they are captured at the smallest scope
//! (module, then event) and recorded in a
//! [`DispatchReport`](crate::event::DispatchReport) or logged by the adapter.
//!
//! [`RoutingError`] is raised only while the routing table is being built.
use crate::plugin_system::traits::ModuleError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Failed to extract plugin context: {reason}")]
    ExtractionFailed {
        reason: String,
    },

    #[error("Observer already installed on '{entry_point}'")]
    AlreadyInstalled {
        entry_point: String,
    },

    #[error("Instrumentation refused observer on '{entry_point}': {message}")]
    InstrumentationFailed {
        entry_point: String,
        message: String,
    },

    #[error("Module '{module}' failed to activate: {source}")]
    ActivationFailed {
        module: String,
        #[source]
        source: ModuleError,
    },

    #[error("Module '{module}' panicked during activation: {message}")]
    ActivationPanicked {
        module: String,
        message: String,
    },
}

impl PluginSystemError {
    /// Name of the module this failure belongs to, if any
    pub fn module(&self) -> Option<&str> {
        match self {
            PluginSystemError::ActivationFailed { module, .. }
            | PluginSystemError::ActivationPanicked { module, .. } => Some(module.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("Identity '{key}' is routed more than once")]
    DuplicateIdentity {
        key: String,
    },

    #[error("Identity routes need a non-empty key; unmatched plugins use the default bucket")]
    EmptyIdentity,

    #[error("Module '{module}' appears twice in bucket '{bucket}'")]
    DuplicateModule {
        bucket: String,
        module: String,
    },
}

/// Render a caught panic payload as text
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s_ref) = payload.downcast_ref::<&'static str>() {
        (*s_ref).to_string()
    } else if let Some(s_obj) = payload.downcast_ref::<String>() {
        s_obj.clone()
    } else {
        "Unknown panic reason".to_string()
    }
}
