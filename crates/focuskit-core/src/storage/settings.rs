//! User toggles, persisted through the gateway as a JSON blob.

use serde::{Deserialize, Serialize};

use super::config::{get_by_path, set_by_path};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
    System,
}

/// Outcome of asking the OS whether we may show notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifyPermission {
    #[default]
    Unresolved,
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Start the same quest again after a natural completion.
    pub auto_start_next: bool,
    pub sound_on: bool,
    pub notify_on: bool,
    pub theme_mode: ThemeMode,
    pub notify_permission: NotifyPermission,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_start_next: false,
            sound_on: true,
            notify_on: true,
            theme_mode: ThemeMode::Light,
            notify_permission: NotifyPermission::Unresolved,
        }
    }
}

impl Settings {
    /// Keys accept the stored camelCase names or their snake_case spelling.
    pub fn get(&self, key: &str) -> Option<String> {
        get_by_path(self, &camel_case(key))
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        *self = set_by_path(self, &camel_case(key), value)?;
        Ok(())
    }
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert!(!s.auto_start_next);
        assert!(s.sound_on);
        assert!(s.notify_on);
        assert_eq!(s.theme_mode, ThemeMode::Light);
    }

    #[test]
    fn partial_blob_merges_with_defaults() {
        let s: Settings = serde_json::from_str(r#"{"soundOn": false, "bogus": 1}"#).unwrap();
        assert!(!s.sound_on);
        assert!(s.notify_on);
    }

    #[test]
    fn get_and_set_by_either_spelling() {
        let mut s = Settings::default();
        s.set("sound_on", "false").unwrap();
        assert_eq!(s.get("soundOn").as_deref(), Some("false"));
        s.set("themeMode", "dark").unwrap();
        assert_eq!(s.theme_mode, ThemeMode::Dark);
        assert_eq!(s.get("theme_mode").as_deref(), Some("dark"));
    }

    #[test]
    fn set_rejects_unknown_enum_value() {
        let mut s = Settings::default();
        assert!(s.set("theme_mode", "sepia").is_err());
        assert_eq!(s.theme_mode, ThemeMode::Light);
        assert!(s.set("volume", "3").is_err());
    }
}
