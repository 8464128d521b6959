mod config;
pub mod database;
mod gateway;
pub mod migrations;
mod settings;

pub use config::{Config, LoggingConfig, TimerConfig};
pub use database::{Database, SessionRecord, Stats};
pub use gateway::{MemoryStore, PersistenceGateway, PROGRESSION_KEY, SESSION_KEY, SETTINGS_KEY};
pub use settings::{NotifyPermission, Settings, ThemeMode};

use std::path::PathBuf;

use crate::error::{DatabaseError, Result};

/// Returns the directory holding the database, config and log file.
///
/// `FOCUSKIT_DATA_DIR` wins when set. Otherwise `~/.config/focuskit`, or
/// `~/.config/focuskit-dev` with `FOCUSKIT_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("FOCUSKIT_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSKIT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focuskit-dev")
            } else {
                base_dir.join("focuskit")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| DatabaseError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
