
use std::sync::{Arc, Mutex};

use crate::plugin_system::identity::ExecutionEnvironment;
use crate::plugin_system::traits::{ActivationResult, FeatureModule, module_fn};

/// Module that records every activation into a shared log
pub(crate) fn recording_module(name: &str, log: &Arc<Mutex<Vec<String>>>) -> Arc<dyn FeatureModule> {
    let log = Arc::clone(log);
    let recorded = name.to_string();
    module_fn(name, move |_env: &ExecutionEnvironment| -> ActivationResult {
        log.lock().unwrap().push(recorded.clone());
        Ok(())
    })
}

pub(crate) fn noop_module(name: &str) -> Arc<dyn FeatureModule> {
    module_fn(name, |_env: &ExecutionEnvironment| -> ActivationResult { Ok(()) })
}
