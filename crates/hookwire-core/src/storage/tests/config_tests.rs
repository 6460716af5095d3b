use std::fs;
use std::path::Path;

use serde_json::json;
use tempfile::tempdir;

use crate::kernel::error::{Error, Result};
use crate::storage::config::{ConfigData, ConfigFormat, ConfigSource, SharedConfig};
use crate::storage::error::StorageSystemError;

#[test]
fn test_absent_keys_read_as_defaults() {
    let config = ConfigData::new();

    assert!(!config.get_boolean("system_ui_unlock_super_volume"));
    assert_eq!(config.get_string_as_int("system_ui_control_center_hide_operator", 0), 0);
    assert_eq!(config.get_string_as_int("system_ui_control_center_cc_bluetooth_tile_style", 1), 1);
    assert_eq!(config.get_string("systemui_plugin_card_tiles", ""), "");
    assert_eq!(config.get_string("missing", "fallback"), "fallback");
}

#[test]
fn test_boolean_only_true_for_json_true() {
    let config = ConfigData::new()
        .with("on", true)
        .with("off", false)
        .with("string_true", "true")
        .with("one", 1);

    assert!(config.get_boolean("on"));
    assert!(!config.get_boolean("off"));
    assert!(!config.get_boolean("string_true"));
    assert!(!config.get_boolean("one"));
}

#[test]
fn test_string_as_int_parsing() {
    let config = ConfigData::new()
        .with("list_pref", "3")
        .with("padded", " 2 ")
        .with("number", 7)
        .with("garbage", "three")
        .with("float", 1.5)
        .with("flag", true);

    assert_eq!(config.get_string_as_int("list_pref", 0), 3);
    assert_eq!(config.get_string_as_int("padded", 0), 2);
    assert_eq!(config.get_string_as_int("number", 0), 7);
    assert_eq!(config.get_string_as_int("garbage", 9), 9);
    assert_eq!(config.get_string_as_int("float", 4), 4);
    assert_eq!(config.get_string_as_int("flag", 5), 5);
}

#[test]
fn test_get_string_rejects_non_strings() {
    let config = ConfigData::new().with("tiles", "List_a|b").with("count", 2);

    assert_eq!(config.get_string("tiles", ""), "List_a|b");
    assert_eq!(config.get_string("count", "none"), "none");
}

#[test]
fn test_config_data_basic() -> Result<()> {
    let mut config = ConfigData::new();
    config.set("string_value", "hello")?;
    config.set("int_value", 42)?;
    config.set("bool_value", true)?;

    assert_eq!(config.get::<String>("string_value").as_deref(), Some("hello"));
    assert_eq!(config.get::<i32>("int_value"), Some(42));
    assert_eq!(config.get::<bool>("bool_value"), Some(true));
    assert_eq!(config.get::<bool>("string_value"), None);
    assert_eq!(config.get_or("missing_key", "default".to_string()), "default");

    assert_eq!(config.len(), 3);
    assert!(config.contains_key("int_value"));
    assert_eq!(config.remove("int_value"), Some(json!(42)));
    assert!(!config.contains_key("int_value"));
    Ok(())
}

#[test]
fn test_merge_overrides_existing() {
    let mut base = ConfigData::new().with("a", true).with("b", "1");
    let overlay = ConfigData::new().with("b", "2").with("c", false);

    base.merge(&overlay);

    assert_eq!(base.len(), 3);
    assert_eq!(base.get_string_as_int("b", 0), 2);
    assert!(base.get_boolean("a"));
}

#[test]
fn test_format_from_path() {
    assert_eq!(ConfigFormat::from_path(Path::new("opts.json")), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path(Path::new("OPTS.JSON")), Some(ConfigFormat::Json));
    #[cfg(feature = "yaml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("opts.yml")), Some(ConfigFormat::Yaml));
    #[cfg(feature = "toml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("opts.toml")), Some(ConfigFormat::Toml));
    assert_eq!(ConfigFormat::from_path(Path::new("opts.ini")), None);
    assert_eq!(ConfigFormat::from_path(Path::new("opts")), None);
}

#[test]
fn test_load_json_file() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("options.json");
    fs::write(
        &path,
        r#"{ "system_ui_unlock_super_volume": true, "system_ui_control_center_hide_operator": "3" }"#,
    )
    .expect("Failed to write config");

    let config = ConfigData::load_file(&path)?;
    assert!(config.get_boolean("system_ui_unlock_super_volume"));
    assert_eq!(config.get_string_as_int("system_ui_control_center_hide_operator", 0), 3);
    Ok(())
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_load_yaml_file() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("options.yaml");
    fs::write(&path, "system_ui_plugin_enable_volume_blur: true\nsystemui_plugin_card_tiles: \"List_wifi|bt\"\n")
        .expect("Failed to write config");

    let config = ConfigData::load_file(&path)?;
    assert!(config.get_boolean("system_ui_plugin_enable_volume_blur"));
    assert_eq!(config.get_string("systemui_plugin_card_tiles", ""), "List_wifi|bt");
    Ok(())
}

#[cfg(feature = "toml-config")]
#[test]
fn test_load_toml_file() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("options.toml");
    fs::write(&path, "system_ui_statusbar_music_switch = true\nsystem_ui_control_center_mi_play_entry = \"1\"\n")
        .expect("Failed to write config");

    let config = ConfigData::load_file(&path)?;
    assert!(config.get_boolean("system_ui_statusbar_music_switch"));
    assert_eq!(config.get_string_as_int("system_ui_control_center_mi_play_entry", 0), 1);
    Ok(())
}

#[test]
fn test_load_unsupported_extension() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("options.ini");
    fs::write(&path, "a=1").expect("Failed to write config");

    match ConfigData::load_file(&path) {
        Err(Error::StorageSystem(StorageSystemError::UnsupportedConfigFormat(p))) => {
            assert!(p.ends_with("options.ini"));
        }
        other => panic!("Expected UnsupportedConfigFormat, got {:?}", other),
    }
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("absent.json");

    match ConfigData::load_file(&path) {
        Err(Error::StorageSystem(StorageSystemError::Io { operation, .. })) => {
            assert_eq!(operation, "read_to_string");
        }
        other => panic!("Expected Io error, got {:?}", other),
    }
}

#[test]
fn test_load_malformed_file() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").expect("Failed to write config");

    let result = ConfigData::load_file(&path);
    assert!(matches!(
        result,
        Err(Error::StorageSystem(StorageSystemError::DeserializationError { .. }))
    ));
}

#[test]
fn test_serialize_round_trip_json() -> Result<()> {
    let config = ConfigData::new().with("flag", true).with("mode", "2");
    let text = config.serialize(ConfigFormat::Json)?;
    let back = ConfigData::deserialize(&text, ConfigFormat::Json)?;
    assert_eq!(back, config);
    Ok(())
}

#[test]
fn test_shared_config_sees_updates() -> Result<()> {
    let shared = SharedConfig::new(ConfigData::new());
    let reader: &dyn ConfigSource = &shared;
    assert!(!reader.get_boolean("system_ui_unlock_super_volume"));

    shared.set("system_ui_unlock_super_volume", true)?;
    assert!(reader.get_boolean("system_ui_unlock_super_volume"));

    shared.replace(ConfigData::new().with("system_ui_control_center_hide_operator", "3"));
    assert!(!reader.get_boolean("system_ui_unlock_super_volume"));
    assert_eq!(reader.get_string_as_int("system_ui_control_center_hide_operator", 0), 3);
    assert_eq!(shared.snapshot().len(), 1);
    Ok(())
}

#[test]
fn test_shared_config_clones_share_state() {
    let shared = SharedConfig::default();
    let clone = shared.clone();
    shared.replace(ConfigData::new().with("k", "v"));
    assert_eq!(clone.get_string("k", ""), "v");
}
