use std::sync::{Arc, Mutex, PoisonError};

use log::info;

use hookwire_core::plugin_system::catalog::{self, Feature};
use hookwire_core::plugin_system::{
    ComponentName, ExecutionEnvironment, FeatureModule, HostCall, HostInstrumentation, HostObserver,
    PluginSystemError, module_fn,
};
use hookwire_core::storage::SharedConfig;

/// Package used for simulated plugin components and environments
pub const SIMULATED_PACKAGE: &str = "miui.systemui.plugin";

/// In-process stand-in for the host's method instrumentation.
///
/// Observers are stored per entry point and run by [`fire`](Self::fire), on
/// the calling thread, the way the host runs them after the real call.
#[derive(Default)]
pub struct CliInstrumentation {
    observers: Mutex<Vec<(String, HostObserver)>>,
}

impl CliInstrumentation {
    /// Simulate one completed call of `entry_point`
    pub fn fire(&self, entry_point: &str, call: &HostCall) -> usize {
        let observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        let mut fired = 0;
        for (_, observer) in observers.iter().filter(|(e, _)| e == entry_point) {
            observer(call);
            fired += 1;
        }
        fired
    }
}

impl HostInstrumentation for CliInstrumentation {
    fn observe_after(&self, entry_point: &str, observer: HostObserver) -> Result<(), PluginSystemError> {
        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        observers.push((entry_point.to_string(), observer));
        Ok(())
    }
}

/// Placeholder for a catalog feature: logs the activation instead of patching
/// anything. The card-tiles slot also logs the parsed tile list.
pub fn placeholder_module(feature: Feature, config: SharedConfig) -> Arc<dyn FeatureModule> {
    module_fn(feature.as_str(), move |env: &ExecutionEnvironment| {
        if feature == Feature::CustomCardTiles {
            info!("{} tiles: {:?}", feature, catalog::card_tiles(&config));
        }
        info!("{} activated in {} ({})", feature, env.package(), env.loader());
        Ok(())
    })
}

/// Component for an identity given on the command line: either the flattened
/// `package/class` form or a bare class name
pub fn component_for(identity: &str) -> ComponentName {
    ComponentName::parse(identity).unwrap_or_else(|| ComponentName::new(SIMULATED_PACKAGE, identity))
}
