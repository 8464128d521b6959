//! SQLite-based storage.
//!
//! Provides persistent storage for:
//! - Finished sessions (history) and their statistics
//! - Key-value store for the settings, progression and session blobs

use std::path::Path;

use chrono::{DateTime, Local, NaiveTime, SecondsFormat, TimeZone, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use super::gateway::PersistenceGateway;
use super::migrations;
use crate::error::{DatabaseError, Result};
use crate::timer::{QuestMode, SessionOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub mode: QuestMode,
    pub planned_min: u32,
    pub elapsed_min: f64,
    pub full: bool,
    pub xp_gained: u32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_sessions: u64,
    pub full_sessions: u64,
    pub partial_sessions: u64,
    /// Minutes spent in focus and custom quests.
    pub focus_min: f64,
    pub break_min: f64,
    pub xp_gained: u64,
}

/// SQLite database for session history and the kv blobs.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/focuskit.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("focuskit.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (tests, throwaway runs).
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn).map_err(DatabaseError::from)?;
        Ok(Self { conn })
    }

    /// Append a finished session to the history.
    pub fn insert_session(
        &self,
        outcome: &SessionOutcome,
        xp_gained: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO sessions (mode, planned_min, elapsed_min, full, xp_gained, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                outcome.mode.to_string(),
                outcome.planned_minutes(),
                outcome.elapsed_minutes(),
                outcome.full,
                xp_gained,
                completed_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent sessions first.
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, mode, planned_min, elapsed_min, full, xp_gained, completed_at
             FROM sessions
             ORDER BY completed_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, bool>(4)?,
                row.get::<_, u32>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, mode, planned_min, elapsed_min, full, xp_gained, completed_at) = row?;
            let (Ok(mode), Ok(completed_at)) = (
                mode.parse::<QuestMode>(),
                DateTime::parse_from_rfc3339(&completed_at),
            ) else {
                tracing::warn!(id, "skipping unreadable session row");
                continue;
            };
            records.push(SessionRecord {
                id,
                mode,
                planned_min,
                elapsed_min,
                full,
                xp_gained,
                completed_at: completed_at.with_timezone(&Utc),
            });
        }
        Ok(records)
    }

    /// Sessions completed since local midnight.
    pub fn stats_today(&self) -> Result<Stats, DatabaseError> {
        let midnight = Local::now().date_naive().and_time(NaiveTime::MIN);
        let since = Local
            .from_local_datetime(&midnight)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);
        self.stats_since(Some(since))
    }

    pub fn stats_all(&self) -> Result<Stats, DatabaseError> {
        self.stats_since(None)
    }

    /// Aggregate history, optionally from `since` onwards.
    pub fn stats_since(&self, since: Option<DateTime<Utc>>) -> Result<Stats, DatabaseError> {
        // Fixed-width UTC timestamps sort chronologically as text.
        let since = since
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Micros, true))
            .unwrap_or_default();
        let mut stmt = self.conn.prepare(
            "SELECT mode, full, COUNT(*), COALESCE(SUM(elapsed_min), 0), COALESCE(SUM(xp_gained), 0)
             FROM sessions
             WHERE completed_at >= ?1
             GROUP BY mode, full",
        )?;
        let rows = stmt.query_map(params![since], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, bool>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut stats = Stats::default();
        for row in rows {
            let (mode, full, count, minutes, xp) = row?;
            let count = count.max(0) as u64;
            stats.total_sessions += count;
            if full {
                stats.full_sessions += count;
            } else {
                stats.partial_sessions += count;
            }
            match mode.parse::<QuestMode>() {
                Ok(QuestMode::ShortBreak | QuestMode::LongBreak) => stats.break_min += minutes,
                _ => stats.focus_min += minutes,
            }
            stats.xp_gained += xp.max(0) as u64;
        }
        Ok(stats)
    }
}

impl PersistenceGateway for Database {
    fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn record_session(
        &self,
        outcome: &SessionOutcome,
        xp_gained: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.insert_session(outcome, xp_gained, completed_at)?;
        Ok(())
    }
}
