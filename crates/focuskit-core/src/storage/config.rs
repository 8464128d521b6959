//! TOML-based application configuration.
//!
//! Holds the knobs that are not user toggles:
//! - Quest presets and default lengths
//! - Frame cadence of the interactive timer
//! - Loot drop chance and item list
//! - Log filter
//!
//! Configuration is stored at `<data_dir>/config.toml`. User toggles
//! (sound, notifications, theme) live in [`super::Settings`] instead.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, CoreError, Result};
use crate::progression::LootTable;
use crate::timer::DEFAULT_PRESETS;

/// Quest lengths and timer cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Minutes started by the digit keys 1-4.
    #[serde(default = "default_presets")]
    pub presets: Vec<u32>,
    /// Length of a fresh focus quest before anything is chosen.
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    /// Initial custom quest length.
    #[serde(default = "default_custom_minutes")]
    pub custom_minutes: u32,
    /// Input poll timeout in the interactive timer; one frame per poll.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive. `FOCUSKIT_LOG` overrides it.
    #[serde(default = "default_filter")]
    pub filter: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub loot: LootTable,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_presets() -> Vec<u32> {
    DEFAULT_PRESETS.to_vec()
}
fn default_minutes() -> u32 {
    20
}
fn default_custom_minutes() -> u32 {
    45
}
fn default_frame_ms() -> u64 {
    50
}
fn default_filter() -> String {
    "warn".into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            presets: default_presets(),
            default_minutes: default_minutes(),
            custom_minutes: default_custom_minutes(),
            frame_ms: default_frame_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

pub(crate) fn get_json_value_by_path<'a>(
    root: &'a serde_json::Value,
    key: &str,
) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }

    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

/// Replace the leaf at `key`, parsing `value` as the type already stored there.
pub(crate) fn set_json_value_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let unknown = || ConfigError::UnknownKey(key.to_string());
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let mut parts = key.split('.').peekable();
    if key.is_empty() {
        return Err(unknown());
    }

    let mut current = root;
    while let Some(part) = parts.next() {
        if parts.peek().is_some() {
            current = current.get_mut(part).ok_or_else(unknown)?;
            continue;
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(part).ok_or_else(unknown)?;
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => {
                if let Ok(n) = value.parse::<u64>() {
                    serde_json::Value::Number(n.into())
                } else {
                    value
                        .parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map(serde_json::Value::Number)
                        .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                }
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };
        obj.insert(part.to_string(), new_value);
        return Ok(());
    }

    Err(unknown())
}

/// Dotted-key read of any serializable document.
pub(crate) fn get_by_path<T: Serialize>(doc: &T, key: &str) -> Option<String> {
    let json = serde_json::to_value(doc).ok()?;
    match get_json_value_by_path(&json, key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => Some("null".into()),
        other => Some(other.to_string()),
    }
}

/// Dotted-key write of any serializable document. The result must still
/// deserialize, so enum fields only accept their known values.
pub(crate) fn set_by_path<T>(doc: &T, key: &str, value: &str) -> Result<T, ConfigError>
where
    T: Serialize + serde::de::DeserializeOwned,
{
    let mut json = serde_json::to_value(doc).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    set_json_value_by_path(&mut json, key, value)?;
    serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default path, writing defaults if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                CoreError::from(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "config unreadable, using defaults");
            Self::default()
        })
    }

    /// Persist to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        get_by_path(self, key)
    }

    /// Set a config value by key. Returns error if key is unknown or the
    /// value does not fit the field. Does not save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        *self = set_by_path(self, key, value)?;
        Ok(())
    }

    /// Preset minutes for digit key `n` (1-based).
    pub fn preset(&self, n: usize) -> Option<u32> {
        n.checked_sub(1).and_then(|i| self.timer.presets.get(i)).copied()
    }
}
