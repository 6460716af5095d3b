use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kernel::error::Result;
use crate::storage::error::StorageSystemError;

/// Read-only view of the option store consulted by feature predicates.
///
/// Every accessor is total: an absent key, or a value of the wrong shape,
/// resolves to the documented default instead of an error.
pub trait ConfigSource: Send + Sync {
    /// Boolean flag. Absent or non-boolean values read as `false`.
    fn get_boolean(&self, key: &str) -> bool;

    /// Integer-coded option stored as a string (list preferences store their
    /// selection that way). JSON integers are accepted as well. Absent or
    /// unparsable values read as `default`.
    fn get_string_as_int(&self, key: &str, default: i64) -> i64;

    /// String option. Absent or non-string values read as `default`.
    fn get_string(&self, key: &str, default: &str) -> String;
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// In-memory snapshot of option values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigData {
    values: HashMap<String, Value>,
}

impl ConfigData {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Create a configuration from a HashMap
    pub fn from_hashmap(values: HashMap<String, Value>) -> Self {
        Self { values }
    }

    /// Get a typed value, `None` when absent or of another shape
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Get a typed value with default
    pub fn get_or<T: for<'de> Deserialize<'de>>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Set a configuration value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value =
            serde_json::to_value(value).map_err(|e| StorageSystemError::serialization("json", e))?;
        self.values.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Builder-style [`set`](Self::set) for values that always serialize
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    /// Remove a configuration value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Check if key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Get all keys
    pub fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge with another config, overriding existing values
    pub fn merge(&mut self, other: &ConfigData) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String> {
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(&self)
                .map_err(|e| StorageSystemError::serialization("json", e))?,
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(&self)
                .map_err(|e| StorageSystemError::serialization("yaml", e))?,
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(&self)
                .map_err(|e| StorageSystemError::serialization("toml", e))?,
        };
        Ok(content)
    }

    /// Deserialize from string based on format
    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self> {
        let config = match format {
            ConfigFormat::Json => serde_json::from_str(data)
                .map_err(|e| StorageSystemError::deserialization("json", e))?,
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data)
                .map_err(|e| StorageSystemError::deserialization("yaml", e))?,
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data)
                .map_err(|e| StorageSystemError::deserialization("toml", e))?,
        };
        Ok(config)
    }

    /// Load a snapshot from disk, picking the format from the file extension
    pub fn load_file(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            StorageSystemError::UnsupportedConfigFormat(path.display().to_string())
        })?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| StorageSystemError::io(e, "read_to_string", path.to_path_buf()))?;
        Self::deserialize(&content, format)
    }
}

impl ConfigSource for ConfigData {
    fn get_boolean(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(Value::Bool(true)))
    }

    fn get_string_as_int(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            Some(Value::Number(n)) => n.as_i64().unwrap_or(default),
            _ => default,
        }
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(Value::String(s)) => s.clone(),
            _ => default.to_string(),
        }
    }
}

/// Process-wide option store shared between the host and the dispatcher.
///
/// Each accessor takes the read lock for a single key, so individual reads are
/// atomic while the host may swap or edit options between plugin loads.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<ConfigData>>,
}

impl SharedConfig {
    pub fn new(data: ConfigData) -> Self {
        Self {
            inner: Arc::new(RwLock::new(data)),
        }
    }

    /// Replace the whole snapshot
    pub fn replace(&self, data: ConfigData) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = data;
    }

    /// Set a single option
    pub fn set<T: Serialize>(&self, key: &str, value: T) -> Result<()> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.set(key, value)
    }

    /// Copy of the current values
    pub fn snapshot(&self) -> ConfigData {
        self.read().clone()
    }

    // A writer that panicked cannot leave a half-written map behind, so a
    // poisoned lock is still safe to read.
    fn read(&self) -> RwLockReadGuard<'_, ConfigData> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConfigSource for SharedConfig {
    fn get_boolean(&self, key: &str) -> bool {
        self.read().get_boolean(key)
    }

    fn get_string_as_int(&self, key: &str, default: i64) -> i64 {
        self.read().get_string_as_int(key, default)
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        self.read().get_string(key, default)
    }
}
