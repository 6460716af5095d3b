use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, error};

use crate::event::report::{
    ActivationStatus, DispatchPlan, DispatchReport, DispatchStatus, ModuleOutcome, Pass, PlannedActivation,
};
use crate::event::types::PluginEvent;
use crate::kernel::constants::{DEFAULT_ATTRIBUTION, LOG_TAG};
use crate::plugin_system::error::{panic_message, PluginSystemError};
use crate::plugin_system::identity::ExecutionEnvironment;
use crate::plugin_system::registry::{ModuleDescriptor, RoutingTable};
use crate::storage::ConfigSource;

/// Runs the feature modules that apply to one plugin load.
///
/// A pass runs the `always` bucket, then the identity bucket (routed class or
/// default), sequentially and in table order. Each module is gated on the
/// current configuration and isolated: an error or panic inside one
/// `activate` is recorded and logged, and the next module still runs.
pub struct Dispatcher {
    table: Arc<RoutingTable>,
    config: Arc<dyn ConfigSource>,
    attribution: String,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("attribution", &self.attribution)
            .field("modules", &self.table.module_count())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(table: Arc<RoutingTable>, config: Arc<dyn ConfigSource>) -> Self {
        Self {
            table,
            config,
            attribution: DEFAULT_ATTRIBUTION.to_string(),
        }
    }

    /// Host package name prefixed to every log record
    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.attribution = attribution.into();
        self
    }

    pub fn attribution(&self) -> &str {
        &self.attribution
    }

    pub fn table(&self) -> &Arc<RoutingTable> {
        &self.table
    }

    /// Run one dispatch pass. Never fails and never panics outward; the
    /// report carries every per-module outcome.
    pub fn dispatch(&self, event: &PluginEvent) -> DispatchReport {
        let route = self.table.lookup(event.identity_key());
        let mut report = DispatchReport {
            identity_key: event.identity_key().to_string(),
            bucket: route.bucket.clone(),
            status: DispatchStatus::EnvironmentUnavailable,
            outcomes: Vec::new(),
        };

        // Resolved once and dropped when the pass ends.
        let Some(environment) = event.resolve_environment() else {
            debug!(
                target: LOG_TAG,
                "[{}] Plugin '{}' environment no longer available, skipping",
                self.attribution,
                event.identity_key()
            );
            return report;
        };

        debug!(
            target: LOG_TAG,
            "[{}] Plugin '{}' loaded, routing to bucket '{}'",
            self.attribution,
            event.identity_key(),
            route.bucket
        );

        self.run_pass(Pass::Always, self.table.always(), &environment, &mut report.outcomes);
        self.run_pass(Pass::Identity, route.modules, &environment, &mut report.outcomes);
        report.status = DispatchStatus::Completed;

        debug!(
            target: LOG_TAG,
            "[{}] Dispatch for '{}' complete: {} activated, {} failed",
            self.attribution,
            event.identity_key(),
            report.activated().len(),
            report.failures().count()
        );
        report
    }

    /// Dry run: evaluate every gate for `identity_key` without calling any module
    pub fn plan(&self, identity_key: &str) -> DispatchPlan {
        let route = self.table.lookup(identity_key);
        let entries = self
            .table
            .always()
            .iter()
            .map(|d| (Pass::Always, d))
            .chain(route.modules.iter().map(|d| (Pass::Identity, d)))
            .map(|(pass, descriptor)| PlannedActivation {
                module: descriptor.name().to_string(),
                pass,
                predicate: descriptor.predicate().to_string(),
                active: descriptor.should_activate(self.config.as_ref()),
            })
            .collect();

        DispatchPlan {
            identity_key: identity_key.to_string(),
            bucket: route.bucket,
            entries,
        }
    }

    fn run_pass(
        &self,
        pass: Pass,
        modules: &[ModuleDescriptor],
        environment: &ExecutionEnvironment,
        outcomes: &mut Vec<ModuleOutcome>,
    ) {
        for descriptor in modules {
            let status = if !descriptor.should_activate(self.config.as_ref()) {
                debug!(
                    target: LOG_TAG,
                    "[{}] Module '{}' gated off ({})",
                    self.attribution,
                    descriptor.name(),
                    descriptor.predicate()
                );
                ActivationStatus::Inactive
            } else {
                match self.activate(descriptor, environment) {
                    Ok(()) => ActivationStatus::Activated,
                    Err(e) => {
                        error!(target: LOG_TAG, "[{}] {}", self.attribution, e);
                        ActivationStatus::Failed(e)
                    }
                }
            };
            outcomes.push(ModuleOutcome {
                module: descriptor.name().to_string(),
                pass,
                status,
            });
        }
    }

    fn activate(&self, descriptor: &ModuleDescriptor, environment: &ExecutionEnvironment) -> Result<(), PluginSystemError> {
        let module = descriptor.module();
        match panic::catch_unwind(AssertUnwindSafe(|| module.activate(environment))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(PluginSystemError::ActivationFailed {
                module: descriptor.name().to_string(),
                source,
            }),
            Err(payload) => Err(PluginSystemError::ActivationPanicked {
                module: descriptor.name().to_string(),
                message: panic_message(&*payload),
            }),
        }
    }
}
