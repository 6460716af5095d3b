#![cfg(test)]

use std::cell::RefCell;
use std::sync::{Arc, Mutex, Once};

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::event::Dispatcher;
use crate::plugin_system::catalog::{self, Feature};
use crate::plugin_system::{ExecutionEnvironment, FeatureModule, RoutingTable, module_fn};
use crate::storage::ConfigSource;

// ===== LOG CAPTURE =====

/// One log record as seen by [`capture_logs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
}

thread_local! {
    static CAPTURED: RefCell<Option<Vec<CapturedRecord>>> = const { RefCell::new(None) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let captured = CapturedRecord {
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        };
        CAPTURED.with(|slot| {
            if let Some(records) = slot.borrow_mut().as_mut() {
                records.push(captured);
            }
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

/// Run `f` and return what it logged on the current thread.
///
/// Dispatch runs on the caller's thread, so records from tests running in
/// parallel never mix.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<CapturedRecord>) {
    INSTALL.call_once(|| {
        log::set_logger(&LOGGER).expect("no other logger is installed in core tests");
        log::set_max_level(LevelFilter::Trace);
    });

    CAPTURED.with(|slot| *slot.borrow_mut() = Some(Vec::new()));
    let value = f();
    let records = CAPTURED.with(|slot| slot.borrow_mut().take().unwrap_or_default());
    (value, records)
}

// ===== CATALOG HELPERS =====

pub type FeatureLog = Arc<Mutex<Vec<Feature>>>;

/// Standard catalog whose modules record their feature slot when activated
pub fn recording_catalog(log: &FeatureLog) -> RoutingTable {
    catalog::standard_table(|feature| -> Arc<dyn FeatureModule> {
        let log = Arc::clone(log);
        module_fn(feature.as_str(), move |_env: &ExecutionEnvironment| {
            log.lock().unwrap().push(feature);
            Ok(())
        })
    })
    .expect("catalog should build")
}

pub fn catalog_dispatcher(log: &FeatureLog, config: impl ConfigSource + 'static) -> Dispatcher {
    Dispatcher::new(Arc::new(recording_catalog(log)), Arc::new(config))
}

pub fn plugin_environment() -> Arc<ExecutionEnvironment> {
    Arc::new(ExecutionEnvironment::new("miui.systemui.plugin", "PathClassLoader"))
}
