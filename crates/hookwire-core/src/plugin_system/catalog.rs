//! The SystemUI routing catalog.
//!
//! Encodes which feature modules apply to which SystemUI plugin, and the
//! options gating each one. Module implementations are supplied by the host
//! through a provider closure; this file only holds the mapping.
use std::fmt;
use std::sync::Arc;

use crate::feature_gate::{ConfigPredicate, IntTest};
use crate::plugin_system::error::RoutingError;
use crate::plugin_system::registry::{ModuleDescriptor, RoutingTable};
use crate::plugin_system::traits::FeatureModule;
use crate::storage::ConfigSource;

pub const VOLUME_DIALOG_PLUGIN: &str = "miui.systemui.volume.VolumeDialogPlugin";
pub const MI_PLAY_PLUGIN: &str = "miui.systemui.miplay.MiPlayPluginImpl";
pub const CONTROL_CENTER_PLUGIN: &str = "miui.systemui.controlcenter.MiuiControlCenter";
pub const NOTIFICATION_STAT_PLUGIN: &str = "miui.systemui.notification.NotificationStatPluginImpl";

/// Option holding the `|`-separated card tile list
pub const CARD_TILES_KEY: &str = "systemui_plugin_card_tiles";

/// Every module slot the catalog routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    // always
    CustomCardTiles,
    CcGridForHyperOs,
    QsColor,
    DefaultPluginTheme,
    // volume dialog
    EnableVolumeBlur,
    ShowVolumePct,
    SuperVolume,
    NotificationVolumeSeparateSlider,
    // mi play
    HideMiPlayEntry,
    // control center
    HideEditButton,
    // notification stat
    FocusNotifLyric,
    // default bucket
    HideMiSmartHubEntry,
    HideDeviceControlEntry,
    BluetoothTileStyle,
    ShowDeviceName,
    DisableDeviceManaged,
}

impl Feature {
    pub const ALWAYS: [Feature; 4] = [
        Feature::CustomCardTiles,
        Feature::CcGridForHyperOs,
        Feature::QsColor,
        Feature::DefaultPluginTheme,
    ];

    pub const DEFAULT_BUCKET: [Feature; 5] = [
        Feature::HideMiSmartHubEntry,
        Feature::HideDeviceControlEntry,
        Feature::BluetoothTileStyle,
        Feature::ShowDeviceName,
        Feature::DisableDeviceManaged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::CustomCardTiles => "custom_card_tiles",
            Feature::CcGridForHyperOs => "cc_grid_for_hyperos",
            Feature::QsColor => "qs_color",
            Feature::DefaultPluginTheme => "default_plugin_theme",
            Feature::EnableVolumeBlur => "enable_volume_blur",
            Feature::ShowVolumePct => "show_volume_pct",
            Feature::SuperVolume => "super_volume",
            Feature::NotificationVolumeSeparateSlider => "notification_volume_separate_slider",
            Feature::HideMiPlayEntry => "hide_mi_play_entry",
            Feature::HideEditButton => "hide_edit_button",
            Feature::FocusNotifLyric => "focus_notif_lyric",
            Feature::HideMiSmartHubEntry => "hide_mi_smart_hub_entry",
            Feature::HideDeviceControlEntry => "hide_device_control_entry",
            Feature::BluetoothTileStyle => "bluetooth_tile_style",
            Feature::ShowDeviceName => "show_device_name",
            Feature::DisableDeviceManaged => "disable_device_managed",
        }
    }

    /// Options that must hold for this feature to activate
    pub fn predicate(&self) -> ConfigPredicate {
        use ConfigPredicate as P;
        match self {
            Feature::CustomCardTiles => P::all([
                P::flag("systemui_plugin_card_tiles_enabled"),
                P::non_empty(CARD_TILES_KEY),
            ]),
            Feature::CcGridForHyperOs => P::flag("system_ui_control_center_rounded_rect"),
            Feature::QsColor => P::any([
                P::flag("system_ui_control_center_qs_open_color"),
                P::flag("system_ui_control_center_qs_big_open_color"),
            ]),
            Feature::DefaultPluginTheme => P::flag("system_ui_other_default_plugin_theme"),
            Feature::EnableVolumeBlur => P::flag("system_ui_plugin_enable_volume_blur"),
            Feature::ShowVolumePct => P::flag("system_cc_volume_showpct_title"),
            Feature::SuperVolume => P::flag("system_ui_unlock_super_volume"),
            Feature::NotificationVolumeSeparateSlider => P::all([
                P::flag("system_framework_volume_separate_control"),
                P::flag("system_framework_volume_separate_slider"),
            ]),
            Feature::HideMiPlayEntry => {
                P::int("system_ui_control_center_mi_play_entry", 0, IntTest::Ne(0))
            }
            Feature::HideEditButton => P::flag("system_ui_control_center_hide_edit_botton"),
            Feature::FocusNotifLyric => P::flag("system_ui_statusbar_music_switch"),
            Feature::HideMiSmartHubEntry => {
                P::int("system_ui_control_center_mi_smart_hub_entry", 0, IntTest::Ne(0))
            }
            Feature::HideDeviceControlEntry => {
                P::int("system_ui_control_center_device_ctrl_entry", 0, IntTest::Ne(0))
            }
            Feature::BluetoothTileStyle => {
                P::int("system_ui_control_center_cc_bluetooth_tile_style", 1, IntTest::Gt(1))
            }
            Feature::ShowDeviceName => {
                P::int("system_ui_control_center_hide_operator", 0, IntTest::Eq(3))
            }
            Feature::DisableDeviceManaged => {
                P::flag("system_ui_control_center_disable_device_managed")
            }
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity routes in declaration order
pub fn identity_routes() -> [(&'static str, &'static [Feature]); 4] {
    [
        (
            VOLUME_DIALOG_PLUGIN,
            &[
                Feature::EnableVolumeBlur,
                Feature::ShowVolumePct,
                Feature::SuperVolume,
                Feature::NotificationVolumeSeparateSlider,
            ],
        ),
        (MI_PLAY_PLUGIN, &[Feature::HideMiPlayEntry]),
        (CONTROL_CENTER_PLUGIN, &[Feature::HideEditButton]),
        (NOTIFICATION_STAT_PLUGIN, &[Feature::FocusNotifLyric]),
    ]
}

/// Build the SystemUI routing table, asking `provider` for each module handle.
///
/// Descriptors are named after the [`Feature`] slot, whatever the supplied
/// module calls itself.
pub fn standard_table<F>(mut provider: F) -> Result<RoutingTable, RoutingError>
where
    F: FnMut(Feature) -> Arc<dyn FeatureModule>,
{
    let mut describe = |feature: Feature| {
        ModuleDescriptor::named(feature.as_str(), feature.predicate(), provider(feature))
    };

    let mut builder = RoutingTable::builder();
    for feature in Feature::ALWAYS {
        builder = builder.always(describe(feature));
    }
    for (key, features) in identity_routes() {
        let modules: Vec<_> = features.iter().map(|f| describe(*f)).collect();
        builder = builder.route(key, modules);
    }
    for feature in Feature::DEFAULT_BUCKET {
        builder = builder.fallback(describe(feature));
    }
    builder.build()
}

/// Tiles configured for the card-style tile module.
///
/// The stored value is a `|`-separated list that may carry `List_` markers.
/// Markers are stripped; trailing empty segments are dropped.
pub fn card_tiles(config: &dyn ConfigSource) -> Vec<String> {
    let raw = config.get_string(CARD_TILES_KEY, "").replace("List_", "");
    if raw.is_empty() {
        return Vec::new();
    }
    let mut tiles: Vec<String> = raw.split('|').map(str::to_string).collect();
    while tiles.last().is_some_and(|t| t.is_empty()) {
        tiles.pop();
    }
    tiles
}
