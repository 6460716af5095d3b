//! Hook adapter: the only part of the core that knows how the host reports
//! plugin creation.
//!
//! The adapter registers one post-call observer on the host's plugin-context
//! factory. For every call it pulls the created context and the factory out of
//! the call record, builds a [`PluginEvent`] and hands it to the
//! [`Dispatcher`] on the same thread. Whatever goes wrong downstream is logged
//! and dropped here; the host's own call path is never affected.
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, info};

use crate::event::dispatcher::Dispatcher;
use crate::event::report::DispatchReport;
use crate::event::types::PluginEvent;
use crate::kernel::constants::{LOG_TAG, PLUGIN_CONTEXT_ENTRY_POINT};
use crate::plugin_system::error::{panic_message, PluginSystemError};
use crate::plugin_system::identity::{ExecutionEnvironment, PluginFactory};

/// Callback the instrumentation layer invokes after each observed call
pub type HostObserver = Box<dyn Fn(&HostCall) + Send + Sync>;

/// Host instrumentation boundary: lets the core observe a host entry point
pub trait HostInstrumentation {
    /// Invoke `observer` after every completed execution of `entry_point`
    fn observe_after(&self, entry_point: &str, observer: HostObserver) -> Result<(), PluginSystemError>;
}

/// One completed host call as delivered by the instrumentation layer.
///
/// Both halves are dynamically typed on the host side, so either may be
/// missing or of an unexpected type.
#[derive(Clone, Default)]
pub struct HostCall {
    /// Object the entry point was invoked on (the plugin factory)
    pub receiver: Option<Arc<dyn PluginFactory>>,
    /// Value the entry point returned (the plugin's context)
    pub result: Option<Arc<dyn Any + Send + Sync>>,
}

impl HostCall {
    /// Call record for a successful plugin-context creation
    pub fn plugin_context(factory: Arc<dyn PluginFactory>, environment: Arc<ExecutionEnvironment>) -> Self {
        Self {
            receiver: Some(factory),
            result: Some(environment),
        }
    }
}

impl fmt::Debug for HostCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCall")
            .field("receiver", &self.receiver.as_ref().and_then(|r| r.component_name()))
            .field("has_result", &self.result.is_some())
            .finish()
    }
}

/// Receives the report of every dispatch driven by the installed observer
pub type ReportSink = Box<dyn Fn(&DispatchReport) + Send + Sync>;

/// Bridges host plugin-creation calls to the [`Dispatcher`]
pub struct HookAdapter {
    dispatcher: Arc<Dispatcher>,
    installed: AtomicBool,
    report_sink: Option<ReportSink>,
}

impl fmt::Debug for HookAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookAdapter")
            .field("dispatcher", &self.dispatcher)
            .field("installed", &self.is_installed())
            .field("report_sink", &self.report_sink.is_some())
            .finish()
    }
}

impl HookAdapter {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            installed: AtomicBool::new(false),
            report_sink: None,
        }
    }

    /// Forward reports produced on the host-call path to `sink`
    pub fn with_report_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&DispatchReport) + Send + Sync + 'static,
    {
        self.report_sink = Some(Box::new(sink));
        self
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    /// Register the post-call observer. Only one observer is ever installed
    /// per adapter; a second call fails with `AlreadyInstalled`.
    pub fn install(self: &Arc<Self>, instrumentation: &dyn HostInstrumentation) -> Result<(), PluginSystemError> {
        if self.installed.swap(true, Ordering::SeqCst) {
            return Err(PluginSystemError::AlreadyInstalled {
                entry_point: PLUGIN_CONTEXT_ENTRY_POINT.to_string(),
            });
        }

        let adapter = Arc::clone(self);
        let observer: HostObserver = Box::new(move |call: &HostCall| {
            let Some(report) = adapter.on_plugin_context_created(call) else {
                return;
            };
            if let Some(sink) = &adapter.report_sink {
                // A sink that panics must not unwind into the host either.
                if panic::catch_unwind(AssertUnwindSafe(|| sink(&report))).is_err() {
                    error!(target: LOG_TAG, "[{}] Report sink panicked", adapter.dispatcher.attribution());
                }
            }
        });

        if let Err(e) = instrumentation.observe_after(PLUGIN_CONTEXT_ENTRY_POINT, observer) {
            self.installed.store(false, Ordering::SeqCst);
            return Err(e);
        }

        info!(
            target: LOG_TAG,
            "[{}] Observing {}",
            self.dispatcher.attribution(),
            PLUGIN_CONTEXT_ENTRY_POINT
        );
        Ok(())
    }

    /// Observer body. Returns the dispatch report, or `None` when the call
    /// could not be turned into an event; in that case the failure is logged
    /// and the event is abandoned.
    pub fn on_plugin_context_created(&self, call: &HostCall) -> Option<DispatchReport> {
        let attribution = self.dispatcher.attribution();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let event = self.extract(call)?;
            Ok::<_, PluginSystemError>(self.dispatcher.dispatch(&event))
        }));

        match outcome {
            Ok(Ok(report)) => Some(report),
            Ok(Err(e)) => {
                error!(target: LOG_TAG, "[{}] {}", attribution, e);
                None
            }
            Err(payload) => {
                error!(
                    target: LOG_TAG,
                    "[{}] Panic while handling plugin load: {}",
                    attribution,
                    panic_message(&*payload)
                );
                None
            }
        }
    }

    fn extract(&self, call: &HostCall) -> Result<PluginEvent, PluginSystemError> {
        let factory = call
            .receiver
            .as_ref()
            .ok_or_else(|| extraction_failed("call has no plugin factory"))?;
        let result = call
            .result
            .clone()
            .ok_or_else(|| extraction_failed("call returned no plugin context"))?;
        let environment = result
            .downcast::<ExecutionEnvironment>()
            .map_err(|_| extraction_failed("returned value is not a plugin execution environment"))?;

        // Only a weak handle leaves this function; the host keeps ownership.
        Ok(PluginEvent::from_factory(&**factory, Arc::downgrade(&environment)))
    }
}

fn extraction_failed(reason: &str) -> PluginSystemError {
    PluginSystemError::ExtractionFailed {
        reason: reason.to_string(),
    }
}
