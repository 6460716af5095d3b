//! # Hookwire Event Dispatch
//!
//! A [`PluginEvent`] is created for each host plugin load and handed to the
//! [`Dispatcher`], which runs the matching feature modules synchronously and
//! returns a [`DispatchReport`]. [`Dispatcher::plan`] performs the same
//! routing and gating as a dry run.
pub mod dispatcher;
pub mod report;
pub mod types;

pub use dispatcher::Dispatcher;
pub use report::{
    ActivationStatus, DispatchPlan, DispatchReport, DispatchStatus, ModuleOutcome, Pass, PlannedActivation,
};
pub use types::PluginEvent;
