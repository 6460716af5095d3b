pub mod event;
pub mod feature_gate;
pub mod kernel;
pub mod plugin_system;
pub mod storage;

#[cfg(test)]
mod tests;

// Re-export key public types for the binary and for hosts embedding the core
pub use event::{DispatchPlan, DispatchReport, Dispatcher, PluginEvent};
pub use feature_gate::{ConfigPredicate, IntTest};
pub use kernel::error::Error as KernelError;
pub use plugin_system::{
    ExecutionEnvironment, FeatureModule, HookAdapter, HostInstrumentation, ModuleDescriptor, RoutingTable,
};
pub use storage::{ConfigData, ConfigSource, SharedConfig};
