//! # Hookwire Kernel Errors
//!
//! Defines the crate-wide [`Error`] enum. Each subsystem owns a typed error
//! (plugin system, routing, storage) and this enum wraps them so callers that
//! cross subsystem boundaries can use a single `Result` alias.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::plugin_system::error::{PluginSystemError, RoutingError};
use crate::storage::error::StorageSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Hook installation, extraction or module activation failure
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Routing table construction failure
    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    /// Configuration loading or serialization failure
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
