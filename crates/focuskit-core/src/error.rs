//! Error types for focuskit-core.
//!
//! The timer and progression logic cannot fail: every input is clamped
//! before use. Errors only come from the edges (the local store, the
//! config file and the best-effort alert sinks).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error returned by fallible library calls.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("storage: {0}")]
    Database(#[from] DatabaseError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("alert: {0}")]
    Alert(#[from] AlertError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the SQLite store or its directory.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("cannot open {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Any statement that SQLite rejected; carries the driver message.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Another process holds the write lock.
    #[error("database is locked by another focuskit process")]
    Locked,

    #[error("cannot create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Problems reading, writing or editing `config.toml` and the settings blob.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("cannot write {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// The value does not parse as the type stored under `key`.
    #[error("bad value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("bad {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Notification/sound delivery errors. Always swallowed by the gateway.
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("no notification helper available")]
    Unsupported,

    #[error("notification helper failed: {0}")]
    HelperFailed(String),

    #[error("alert io failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked) => {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rusqlite_errors_map_to_query_failed() {
        let err: DatabaseError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, DatabaseError::QueryFailed(_)));
    }

    #[test]
    fn busy_database_maps_to_locked() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(matches!(DatabaseError::from(err), DatabaseError::Locked));
    }

    #[test]
    fn core_error_wraps_config_error() {
        let err: CoreError = ConfigError::UnknownKey("timer.nope".into()).into();
        assert_eq!(err.to_string(), "config: unknown config key: timer.nope");
    }
}
