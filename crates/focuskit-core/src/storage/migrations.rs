//! Schema migrations for `focuskit.db`.
//!
//! Each step runs once, inside its own transaction, and bumps the version
//! recorded in `schema_version`.

use rusqlite::{Connection, Result as SqliteResult};

/// Ordered schema steps. Step `n` brings the database to version `n + 1`.
const STEPS: &[&str] = &[
    // 1: kv blobs and session history
    "CREATE TABLE IF NOT EXISTS kv (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS sessions (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        mode         TEXT NOT NULL,
        planned_min  INTEGER NOT NULL,
        elapsed_min  REAL NOT NULL,
        full         INTEGER NOT NULL,
        completed_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_sessions_completed_at ON sessions(completed_at);",
    // 2: XP awarded per session
    "ALTER TABLE sessions ADD COLUMN xp_gained INTEGER NOT NULL DEFAULT 0;",
];

pub const SCHEMA_VERSION: i32 = STEPS.len() as i32;

/// Bring `conn` up to [`SCHEMA_VERSION`].
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    migrate_to(conn, SCHEMA_VERSION)
}

fn migrate_to(conn: &Connection, target: i32) -> SqliteResult<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);")?;

    let current = get_schema_version(conn);
    for (index, sql) in STEPS.iter().enumerate() {
        let version = index as i32 + 1;
        if version <= current || version > target {
            continue;
        }
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.execute("DELETE FROM schema_version", [])?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
        tx.commit()?;
        tracing::debug!(version, "applied schema migration");
    }
    Ok(())
}

/// Version recorded in the database, 0 for a fresh file.
pub fn get_schema_version(conn: &Connection) -> i32 {
    match conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0)) {
        Ok(version) => version,
        Err(rusqlite::Error::QueryReturnedNoRows) => 0,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read schema_version");
            0
        }
    }
}
