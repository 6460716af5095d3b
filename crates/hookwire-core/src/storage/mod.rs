//! # Hookwire Storage
//!
//! The configuration store boundary. Feature predicates only ever see the
//! read-only [`ConfigSource`] trait; [`ConfigData`] and [`SharedConfig`] are
//! the in-process implementations, loadable from JSON, YAML or TOML files.
pub mod config;
pub mod error;

pub use config::{ConfigData, ConfigFormat, ConfigSource, SharedConfig};
pub use error::StorageSystemError;

// Test module declaration
#[cfg(test)]
mod tests;
