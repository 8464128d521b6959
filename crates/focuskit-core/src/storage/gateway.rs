//! Versioned key-value persistence for settings, progression and the
//! in-flight session.
//!
//! Reads are tolerant: a missing or malformed blob yields defaults and a
//! warning instead of an error, so a corrupt store never blocks startup.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::settings::Settings;
use crate::error::DatabaseError;
use crate::progression::Progression;
use crate::timer::{SessionOutcome, SessionSnapshot};

pub const SETTINGS_KEY: &str = "focuskit.settings.v3";
pub const PROGRESSION_KEY: &str = "focuskit.meta.v3";
pub const SESSION_KEY: &str = "focuskit.state.v3";

/// Storage seam used by the controller.
///
/// Implementors only provide raw string access; the typed helpers are
/// shared.
pub trait PersistenceGateway {
    fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError>;
    fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError>;

    /// Append a finished session to the history, when the store keeps one.
    fn record_session(
        &self,
        _outcome: &SessionOutcome,
        _xp_gained: u32,
        _completed_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        Ok(())
    }

    fn load_settings(&self) -> Settings {
        load_or_default(self, SETTINGS_KEY)
    }

    fn save_settings(&self, settings: &Settings) -> Result<(), DatabaseError> {
        save_json(self, SETTINGS_KEY, settings)
    }

    fn load_progression(&self) -> Progression {
        load_or_default::<Progression, _>(self, PROGRESSION_KEY).normalized()
    }

    fn save_progression(&self, progression: &Progression) -> Result<(), DatabaseError> {
        save_json(self, PROGRESSION_KEY, progression)
    }

    fn load_session(&self) -> SessionSnapshot {
        load_or_default(self, SESSION_KEY)
    }

    fn save_session(&self, snapshot: &SessionSnapshot) -> Result<(), DatabaseError> {
        save_json(self, SESSION_KEY, snapshot)
    }
}

fn load_or_default<T, G>(store: &G, key: &str) -> T
where
    T: DeserializeOwned + Default,
    G: PersistenceGateway + ?Sized,
{
    let raw = match store.kv_get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "store read failed, using defaults");
            return T::default();
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "malformed blob, using defaults");
        T::default()
    })
}

fn save_json<T, G>(store: &G, key: &str, value: &T) -> Result<(), DatabaseError>
where
    T: Serialize,
    G: PersistenceGateway + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
    store.kv_set(key, &json)
}

/// In-process store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    history: RefCell<Vec<(SessionOutcome, u32)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw value, bypassing serialization.
    pub fn with_raw(self, key: &str, value: &str) -> Self {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Sessions recorded so far with the XP each earned.
    pub fn history(&self) -> Vec<(SessionOutcome, u32)> {
        self.history.borrow().clone()
    }
}

impl PersistenceGateway for MemoryStore {
    fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        Ok(self.raw(key))
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn record_session(
        &self,
        outcome: &SessionOutcome,
        xp_gained: u32,
        _completed_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.history.borrow_mut().push((*outcome, xp_gained));
        Ok(())
    }
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for std::rc::Rc<G> {
    fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        (**self).kv_get(key)
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        (**self).kv_set(key, value)
    }

    fn record_session(
        &self,
        outcome: &SessionOutcome,
        xp_gained: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        (**self).record_session(outcome, xp_gained, completed_at)
    }
}
