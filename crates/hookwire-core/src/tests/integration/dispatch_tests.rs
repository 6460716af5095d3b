//! End-to-end dispatch scenarios against the standard SystemUI catalog.
use std::ptr;
use std::sync::Arc;
use std::thread;

use log::Level;

use crate::event::{DispatchStatus, Dispatcher, PluginEvent};
use crate::kernel::constants::LOG_TAG;
use crate::plugin_system::catalog::{self, Feature, VOLUME_DIALOG_PLUGIN};
use crate::plugin_system::{Bucket, ComponentName, ExecutionEnvironment, FeatureModule, HookAdapter, HostCall, module_fn};
use crate::storage::ConfigData;
use crate::tests::integration::common::{
    FeatureLog, capture_logs, catalog_dispatcher, plugin_environment, recording_catalog,
};

#[test]
fn super_volume_only() {
    let log: FeatureLog = Arc::default();
    let d = catalog_dispatcher(&log, ConfigData::new().with("system_ui_unlock_super_volume", true));
    let env = plugin_environment();

    let report = d.dispatch(&PluginEvent::new(VOLUME_DIALOG_PLUGIN, Arc::downgrade(&env)));

    assert!(report.is_complete());
    assert_eq!(*log.lock().unwrap(), vec![Feature::SuperVolume]);
    assert_eq!(report.activated(), vec!["super_volume"]);
    // Four always modules plus four volume modules were considered.
    assert_eq!(report.outcomes.len(), 8);
}

#[test]
fn short_volume_dialog_name_runs_super_volume_only() {
    let log: FeatureLog = Arc::default();
    let d = catalog_dispatcher(&log, ConfigData::new().with("system_ui_unlock_super_volume", true));
    let env = plugin_environment();

    let report = d.dispatch(&PluginEvent::new("VolumeDialogPlugin", Arc::downgrade(&env)));

    assert_eq!(report.bucket, Bucket::Identity(VOLUME_DIALOG_PLUGIN.to_string()));
    assert_eq!(*log.lock().unwrap(), vec![Feature::SuperVolume]);
    assert_eq!(report.activated(), vec!["super_volume"]);
}

#[test]
fn expired_handle_logs_one_debug_record() {
    let log: FeatureLog = Arc::default();
    let d = catalog_dispatcher(&log, ConfigData::new().with("system_ui_unlock_super_volume", true));
    let env = plugin_environment();
    let event = PluginEvent::new(VOLUME_DIALOG_PLUGIN, Arc::downgrade(&env));
    drop(env);

    let (report, records) = capture_logs(|| d.dispatch(&event));

    assert_eq!(report.status, DispatchStatus::EnvironmentUnavailable);
    assert_eq!(records.len(), 1, "records: {:?}", records);
    assert_eq!(records[0].level, Level::Debug);
    assert_eq!(records[0].target, LOG_TAG);
    assert!(records[0].message.starts_with("[com.android.systemui] "), "{}", records[0].message);
    assert!(records[0].message.contains(VOLUME_DIALOG_PLUGIN));
}

#[test]
fn unknown_plugin_runs_eligible_default_modules_in_order() {
    let log: FeatureLog = Arc::default();
    let config = ConfigData::new()
        .with("system_ui_control_center_hide_operator", "3")
        .with("system_ui_control_center_mi_smart_hub_entry", "1");
    let d = catalog_dispatcher(&log, config);
    let env = plugin_environment();

    let report = d.dispatch(&PluginEvent::new("miui.systemui.UnknownFuturePlugin", Arc::downgrade(&env)));

    assert_eq!(d.table().default_bucket().len(), 5);
    assert_eq!(*log.lock().unwrap(), vec![Feature::HideMiSmartHubEntry, Feature::ShowDeviceName]);
    assert_eq!(report.failures().count(), 0);
}

#[test]
fn empty_identity_gets_always_and_default() {
    let log: FeatureLog = Arc::default();
    let config = ConfigData::new()
        .with("system_ui_other_default_plugin_theme", true)
        .with("system_ui_control_center_disable_device_managed", true)
        .with("system_ui_unlock_super_volume", true);
    let d = catalog_dispatcher(&log, config);
    let env = plugin_environment();

    d.dispatch(&PluginEvent::new("", Arc::downgrade(&env)));

    assert_eq!(*log.lock().unwrap(), vec![Feature::DefaultPluginTheme, Feature::DisableDeviceManaged]);
}

#[test]
fn expired_handle_invokes_nothing() {
    let log: FeatureLog = Arc::default();
    let d = catalog_dispatcher(&log, ConfigData::new().with("system_ui_unlock_super_volume", true));
    let env = plugin_environment();
    let event = PluginEvent::new(VOLUME_DIALOG_PLUGIN, Arc::downgrade(&env));
    drop(env);

    let report = d.dispatch(&event);

    assert_eq!(report.status, DispatchStatus::EnvironmentUnavailable);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn repeated_lookups_are_identical() {
    let log: FeatureLog = Arc::default();
    let table = recording_catalog(&log);

    for key in [VOLUME_DIALOG_PLUGIN, "miui.systemui.Other", ""] {
        let first = table.lookup(key);
        let second = table.lookup(key);
        assert!(ptr::eq(first.modules, second.modules));
        assert_eq!(first.bucket, second.bucket);
    }
}

#[test]
fn adapter_drives_catalog_from_host_call() {
    let log: FeatureLog = Arc::default();
    let d = catalog_dispatcher(&log, ConfigData::new().with("system_ui_statusbar_music_switch", true));
    let adapter = HookAdapter::new(Arc::new(d));
    let factory = ComponentName::parse("miui.systemui.plugin/miui.systemui.notification.NotificationStatPluginImpl")
        .expect("valid component");

    let report = adapter
        .on_plugin_context_created(&HostCall::plugin_context(Arc::new(factory), plugin_environment()))
        .expect("dispatch should run");

    assert_eq!(report.activated(), vec!["focus_notif_lyric"]);
    assert_eq!(*log.lock().unwrap(), vec![Feature::FocusNotifLyric]);
}

#[test]
fn concurrent_dispatch_shares_one_table() {
    let log: FeatureLog = Arc::default();
    let d = Arc::new(catalog_dispatcher(
        &log,
        ConfigData::new()
            .with("system_ui_control_center_rounded_rect", true)
            .with("system_ui_control_center_hide_edit_botton", true),
    ));

    thread::scope(|scope| {
        for _ in 0..8 {
            let d = Arc::clone(&d);
            scope.spawn(move || {
                let env = plugin_environment();
                let report = d.dispatch(&PluginEvent::new(catalog::CONTROL_CENTER_PLUGIN, Arc::downgrade(&env)));
                assert_eq!(report.activated(), vec!["cc_grid_for_hyperos", "hide_edit_button"]);
            });
        }
    });

    let calls = log.lock().unwrap();
    assert_eq!(calls.len(), 16);
    assert_eq!(calls.iter().filter(|f| **f == Feature::CcGridForHyperOs).count(), 8);
}

#[test]
fn panicking_module_is_isolated_in_catalog() {
    let log: FeatureLog = Arc::default();
    let table = catalog::standard_table(|feature| -> Arc<dyn FeatureModule> {
        let log = Arc::clone(&log);
        module_fn(feature.as_str(), move |_env: &ExecutionEnvironment| {
            if feature == Feature::EnableVolumeBlur {
                panic!("blur target missing");
            }
            log.lock().unwrap().push(feature);
            Ok(())
        })
    })
    .expect("catalog should build");
    let config = ConfigData::new()
        .with("system_ui_plugin_enable_volume_blur", true)
        .with("system_cc_volume_showpct_title", true);
    let d = Dispatcher::new(Arc::new(table), Arc::new(config));
    let env = plugin_environment();

    let report = d.dispatch(&PluginEvent::new(VOLUME_DIALOG_PLUGIN, Arc::downgrade(&env)));

    assert_eq!(*log.lock().unwrap(), vec![Feature::ShowVolumePct]);
    assert_eq!(report.failures().next().map(|o| o.module.as_str()), Some("enable_volume_blur"));
}
