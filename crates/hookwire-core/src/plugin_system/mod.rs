//! # Hookwire Plugin System
//!
//! Everything between the host's plugin-creation call and the list of feature
//! modules that apply to it:
//!
//! - [`adapter`]: observes the host entry point and turns each call into a
//!   [`PluginEvent`](crate::event::PluginEvent)
//! - [`identity`]: component names, identity keys and the weak environment handle
//! - [`traits`]: the [`FeatureModule`] activation contract
//! - [`registry`]: the immutable [`RoutingTable`] and its builder
//! - [`catalog`]: the SystemUI plugin routes and their option gates
pub mod adapter;
pub mod catalog;
pub mod error;
pub mod identity;
pub mod registry;
pub mod traits;

pub use adapter::{HookAdapter, HostCall, HostInstrumentation, HostObserver, ReportSink};
pub use catalog::Feature;
pub use error::{PluginSystemError, RoutingError};
pub use identity::{ComponentName, ExecutionEnvironment, PluginFactory};
pub use registry::{simple_class_name, Bucket, ModuleDescriptor, Route, RoutingTable, RoutingTableBuilder};
pub use traits::{ActivationResult, FeatureModule, FnModule, ModuleError, module_fn};

// Test module declaration
#[cfg(test)]
mod tests;
