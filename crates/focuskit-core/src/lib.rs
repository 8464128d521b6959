//! # Focuskit Core Library
//!
//! Core logic for the focuskit gamified focus timer. All behaviour lives
//! here; the `focuskit` CLI is a thin terminal layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer**: a wall-clock-driven session state machine. The caller feeds
//!   elapsed time from a [`ClockDriver`]; the engine never reads the clock
//! - **Progression**: pure XP, level, streak and achievement computation,
//!   plus cosmetic loot drawn from an injected RNG
//! - **Storage**: versioned JSON blobs behind the [`PersistenceGateway`]
//!   trait, SQLite session history and TOML configuration
//! - **Alerts**: best-effort desktop notification and chime
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: countdown state machine
//! - [`FocusController`]: wires the engine, progression, storage and alerts
//! - [`Database`]: SQLite store and session history
//! - [`Config`]: application configuration

pub mod alerts;
pub mod controller;
pub mod controls;
pub mod error;
pub mod events;
pub mod progression;
pub mod storage;
pub mod timer;

pub use alerts::{AlertSink, Alerts, DesktopSink, RecordingSink};
pub use controller::FocusController;
pub use controls::{dispatch, Control};
pub use error::{AlertError, ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::Event;
pub use progression::{Achievement, LootTable, Progression};
pub use storage::{Config, Database, MemoryStore, PersistenceGateway, Settings, Stats};
pub use timer::{ClockDriver, QuestMode, SessionEngine, SessionState, SystemClock};
