//! Wires the session engine, progression, persistence and alerts together.
//!
//! Every operation returns the events it produced, in order. Storage
//! failures are logged and never interrupt the timer.

use chrono::Utc;
use rand::RngCore;
use tracing::{info, warn};

use crate::alerts::Alerts;
use crate::error::{ConfigError, DatabaseError};
use crate::events::Event;
use crate::progression::{self, loot_rng, LootTable, Progression};
use crate::storage::{Config, PersistenceGateway, Settings, SESSION_KEY};
use crate::timer::{
    Calendar, ClockDriver, LocalCalendar, QuestMode, SessionEngine, SessionOutcome, SessionState,
    TimeSource, BONUS_ROUND_MINUTES, DEFAULT_PRESETS,
};

/// Step by which `+`/`-` change the custom quest length.
pub const CUSTOM_STEP_MINUTES: i64 = 5;

pub const FULL_TITLE: &str = "Focus complete";
pub const FULL_BODY: &str = "+XP added. Keep the streak?";
pub const PARTIAL_TITLE: &str = "Session ended";
pub const PARTIAL_BODY: &str = "Partial XP banked. Bonus round?";

pub struct FocusController {
    engine: SessionEngine,
    progression: Progression,
    settings: Settings,
    store: Box<dyn PersistenceGateway>,
    alerts: Alerts,
    loot: LootTable,
    rng: Box<dyn RngCore>,
    calendar: Box<dyn Calendar>,
    presets: Vec<u32>,
    bonus_available: bool,
}

impl FocusController {
    /// Restore everything the store holds, with default config.
    pub fn new(store: Box<dyn PersistenceGateway>) -> Self {
        Self::with_config(store, &Config::default())
    }

    /// Restore from `store`. The config supplies presets, loot and the
    /// initial quest lengths when no session has been stored yet.
    pub fn with_config(store: Box<dyn PersistenceGateway>, config: &Config) -> Self {
        let engine = match store.kv_get(SESSION_KEY) {
            Ok(Some(_)) => SessionEngine::from_persisted(&store.load_session()),
            _ => SessionEngine::with_defaults(
                f64::from(config.timer.default_minutes),
                i64::from(config.timer.custom_minutes),
            ),
        };
        let presets = if config.timer.presets.is_empty() {
            DEFAULT_PRESETS.to_vec()
        } else {
            config.timer.presets.clone()
        };
        Self {
            engine,
            progression: store.load_progression(),
            settings: store.load_settings(),
            store,
            alerts: Alerts::default(),
            loot: config.loot.clone(),
            rng: Box::new(loot_rng(None)),
            calendar: Box::new(LocalCalendar),
            presets,
            bonus_available: false,
        }
    }

    pub fn with_alerts(mut self, alerts: Alerts) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn with_rng(mut self, rng: Box<dyn RngCore>) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_calendar(mut self, calendar: Box<dyn Calendar>) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn with_loot(mut self, loot: LootTable) -> Self {
        self.loot = loot;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    pub fn state(&self) -> SessionState {
        self.engine.state()
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn presets(&self) -> &[u32] {
        &self.presets
    }

    /// Whether the last session was banked early and a bonus round may
    /// follow.
    pub fn bonus_available(&self) -> bool {
        self.bonus_available
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Commit to a quest without starting it.
    pub fn choose_quest(&mut self, mode: QuestMode, minutes: f64) -> Vec<Event> {
        self.bonus_available = false;
        let events = vec![self.engine.choose_quest(mode, minutes)];
        self.persist_session();
        events
    }

    /// Commit to a quest and start it.
    pub fn start_quest(&mut self, mode: QuestMode, minutes: f64) -> Vec<Event> {
        self.bonus_available = false;
        let mut events = vec![self.engine.choose_quest(mode, minutes)];
        events.extend(self.engine.start_pause());
        self.persist_session();
        events
    }

    /// Start the `n`th preset (1-based). Unknown presets do nothing.
    pub fn start_preset(&mut self, n: usize) -> Vec<Event> {
        let Some(minutes) = n.checked_sub(1).and_then(|i| self.presets.get(i)).copied() else {
            return Vec::new();
        };
        self.bonus_available = false;
        let events = self.engine.start_preset(f64::from(minutes));
        self.persist_session();
        events
    }

    /// Start a custom quest of the remembered custom length.
    pub fn start_custom(&mut self) -> Vec<Event> {
        let minutes = f64::from(self.engine.custom_mins());
        self.start_quest(QuestMode::Custom, minutes)
    }

    /// Change the custom length by `delta` minutes, clamped into `[1, 180]`.
    pub fn adjust_custom(&mut self, delta: i64) -> u32 {
        let minutes = self
            .engine
            .set_custom_minutes(i64::from(self.engine.custom_mins()) + delta);
        self.persist_session();
        minutes
    }

    /// Five minutes of focus after a banked session. Does nothing unless
    /// the last session was banked early and nothing has happened since.
    pub fn bonus_round(&mut self) -> Vec<Event> {
        if !self.bonus_available {
            return Vec::new();
        }
        self.start_quest(QuestMode::Focus, BONUS_ROUND_MINUTES)
    }

    pub fn start_pause(&mut self) -> Vec<Event> {
        let events: Vec<Event> = self.engine.start_pause().into_iter().collect();
        if !events.is_empty() {
            self.persist_session();
        }
        events
    }

    /// Feed `dt` elapsed seconds. The session blob is rewritten whenever
    /// the displayed whole second changes.
    pub fn tick(&mut self, dt: f64) -> Vec<Event> {
        let shown = self.engine.remaining_secs().ceil();
        match self.engine.tick(dt) {
            Some(Event::SessionCompleted { outcome, at }) => self.complete(outcome, at),
            other => {
                if self.engine.remaining_secs().ceil() != shown {
                    self.persist_session();
                }
                other.into_iter().collect()
            }
        }
    }

    /// One frame of `driver`: keeps it started exactly while the engine is
    /// running and ticks with the delta it reports.
    pub fn pump<S: TimeSource>(&mut self, driver: &mut ClockDriver<S>) -> Vec<Event> {
        if !self.engine.is_running() {
            driver.stop();
            return Vec::new();
        }
        driver.start();
        let events = match driver.frame() {
            Some(dt) => self.tick(dt),
            None => Vec::new(),
        };
        if !self.engine.is_running() {
            driver.stop();
        }
        events
    }

    /// Bank a running or paused session now.
    pub fn end_early(&mut self) -> Vec<Event> {
        match self.engine.end_early() {
            Some(Event::SessionCompleted { outcome, at }) => self.complete(outcome, at),
            Some(other) => vec![other],
            None => Vec::new(),
        }
    }

    pub fn reset(&mut self) -> Vec<Event> {
        self.bonus_available = false;
        let events = vec![self.engine.reset()];
        self.persist_session();
        events
    }

    /// Change one user setting by key and persist it.
    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.settings.set(key, value)?;
        self.persist_settings();
        Ok(())
    }

    pub fn update_settings(&mut self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.settings);
        self.persist_settings();
    }

    /// Write all three blobs.
    pub fn save(&self) -> Result<(), DatabaseError> {
        self.store.save_settings(&self.settings)?;
        self.store.save_progression(&self.progression)?;
        self.store.save_session(&self.engine.persisted())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self, outcome: SessionOutcome, at: chrono::DateTime<Utc>) -> Vec<Event> {
        let mut events = vec![Event::SessionCompleted { outcome, at }];

        self.alerts.beep(&self.settings);
        let (title, body) = if outcome.full {
            (FULL_TITLE, FULL_BODY)
        } else {
            (PARTIAL_TITLE, PARTIAL_BODY)
        };
        if self.alerts.notify(&mut self.settings, title, body) {
            self.persist_settings();
        }

        let today = self.calendar.today();
        let grant = progression::grant(&self.progression, &outcome, today);
        self.progression = grant.progression;
        if let Err(e) = self.store.save_progression(&self.progression) {
            warn!(error = %e, "failed to save progression");
        }
        if let Err(e) = self.store.record_session(&outcome, grant.gained, at) {
            warn!(error = %e, "failed to record session");
        }

        let now = Utc::now();
        events.push(Event::XpGranted {
            gained: grant.gained,
            xp: self.progression.xp,
            level: self.progression.level,
            at: now,
        });
        if grant.leveled_up {
            info!(level = self.progression.level, "level up");
            events.push(Event::LevelUp {
                level: self.progression.level,
                levels_gained: grant.levels_gained,
                at: now,
            });
        }
        for achievement in grant.unlocked {
            info!(%achievement, "achievement unlocked");
            events.push(Event::AchievementUnlocked {
                achievement,
                at: now,
            });
        }
        if !outcome.full {
            self.bonus_available = true;
            events.push(Event::PartialXpBanked {
                gained: grant.gained,
                at: now,
            });
        }
        if let Some(item) = self.loot.roll(self.rng.as_mut()) {
            events.push(Event::Loot {
                item: item.to_string(),
                at: now,
            });
        }

        if outcome.full && self.settings.auto_start_next {
            let minutes = outcome.duration_secs / 60.0;
            events.push(self.engine.choose_quest(outcome.mode, minutes));
            events.extend(self.engine.start_pause());
        }
        self.persist_session();
        events
    }

    fn persist_session(&self) {
        if let Err(e) = self.store.save_session(&self.engine.persisted()) {
            warn!(error = %e, "failed to save session");
        }
    }

    fn persist_settings(&self) {
        if let Err(e) = self.store.save_settings(&self.settings) {
            warn!(error = %e, "failed to save settings");
        }
    }
}
