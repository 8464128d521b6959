//! Session state machine.
//!
//! The engine is a wall-clock-driven countdown. It does not use internal
//! threads or read the clock - the caller feeds elapsed seconds to `tick()`
//! (see [`super::ClockDriver`]).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Ready -> Running <-> Paused
//!                     |          |
//!                     +----------+--> Completed
//! (reset from anywhere -> Idle)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new();
//! engine.choose_quest(QuestMode::Focus, 25.0);
//! engine.start_pause();
//! // In a loop:
//! engine.tick(dt); // Returns Some(Event::SessionCompleted) once, at zero
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::quest::{
    clamp_custom_minutes, quest_seconds, QuestMode, DEFAULT_CUSTOM_MINUTES, DEFAULT_FOCUS_MINUTES,
};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No quest chosen.
    Idle,
    /// Quest chosen, nothing elapsed yet.
    Ready,
    Running,
    /// Quest chosen, partly elapsed, not running.
    Paused,
    /// Countdown reached zero (naturally or by banking early).
    Completed,
}

/// Facts about a finished session, handed to the progression engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub mode: QuestMode,
    /// `true` when the countdown ran out, `false` when banked early.
    pub full: bool,
    pub duration_secs: f64,
    pub elapsed_secs: f64,
}

impl SessionOutcome {
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed_secs / 60.0
    }

    /// Committed length rounded to whole minutes.
    pub fn planned_minutes(&self) -> u32 {
        (self.duration_secs / 60.0).round().max(0.0) as u32
    }
}

/// Transient session blob, persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSnapshot {
    pub mode: QuestMode,
    pub running: bool,
    pub duration: f64,
    pub remaining: f64,
    pub custom_mins: u32,
    pub quest_chosen: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        SessionEngine::new().persisted()
    }
}

/// Core session engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEngine {
    mode: QuestMode,
    duration_secs: f64,
    remaining_secs: f64,
    running: bool,
    quest_chosen: bool,
    custom_mins: u32,
}

impl SessionEngine {
    /// Idle focus quest of the default length.
    pub fn new() -> Self {
        let secs = quest_seconds(DEFAULT_FOCUS_MINUTES);
        Self {
            mode: QuestMode::Focus,
            duration_secs: secs,
            remaining_secs: secs,
            running: false,
            quest_chosen: false,
            custom_mins: DEFAULT_CUSTOM_MINUTES,
        }
    }

    /// Idle focus quest with configured default lengths.
    pub fn with_defaults(focus_minutes: f64, custom_minutes: i64) -> Self {
        let secs = quest_seconds(focus_minutes);
        Self {
            duration_secs: secs,
            remaining_secs: secs,
            custom_mins: clamp_custom_minutes(custom_minutes),
            ..Self::new()
        }
    }

    /// Rebuild from a persisted blob. Never resumes running, and repairs
    /// numbers that would break the countdown invariants.
    pub fn from_persisted(snapshot: &SessionSnapshot) -> Self {
        let mut engine = Self::new();
        engine.mode = snapshot.mode;
        engine.custom_mins = clamp_custom_minutes(i64::from(snapshot.custom_mins));
        if snapshot.duration.is_finite() && snapshot.duration > 0.0 {
            engine.duration_secs = snapshot.duration;
            engine.remaining_secs = if snapshot.remaining.is_finite() {
                snapshot.remaining.clamp(0.0, snapshot.duration)
            } else {
                snapshot.duration
            };
        }
        engine.quest_chosen = snapshot.quest_chosen;
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        if !self.quest_chosen {
            SessionState::Idle
        } else if self.running {
            SessionState::Running
        } else if self.remaining_secs <= 0.0 {
            SessionState::Completed
        } else if self.remaining_secs >= self.duration_secs {
            SessionState::Ready
        } else {
            SessionState::Paused
        }
    }

    pub fn mode(&self) -> QuestMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn quest_chosen(&self) -> bool {
        self.quest_chosen
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> f64 {
        self.remaining_secs
    }

    pub fn custom_mins(&self) -> u32 {
        self.custom_mins
    }

    pub fn planned_minutes(&self) -> u32 {
        (self.duration_secs / 60.0).round() as u32
    }

    /// 0.0 .. 1.0 elapsed fraction of the current quest.
    pub fn progress(&self) -> f64 {
        if self.duration_secs <= 0.0 {
            return 0.0;
        }
        (1.0 - self.remaining_secs / self.duration_secs).clamp(0.0, 1.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state(),
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            duration_secs: self.duration_secs,
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    pub fn persisted(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            running: self.running,
            duration: self.duration_secs,
            remaining: self.remaining_secs,
            custom_mins: self.custom_mins,
            quest_chosen: self.quest_chosen,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Commit to a quest. Breaks ignore `minutes`; focus and custom clamp it
    /// into `[1, 180]`. Any quest in flight is replaced without reward.
    pub fn choose_quest(&mut self, mode: QuestMode, minutes: f64) -> Event {
        let minutes = mode.fixed_minutes().unwrap_or(minutes);
        if mode == QuestMode::Custom {
            self.custom_mins = clamp_custom_minutes(round_to_i64(minutes));
        }
        let secs = quest_seconds(minutes);
        self.mode = mode;
        self.duration_secs = secs;
        self.remaining_secs = secs;
        self.running = false;
        self.quest_chosen = true;
        debug!(%mode, duration_secs = secs, "quest chosen");
        Event::QuestChosen {
            mode,
            duration_secs: secs,
            at: Utc::now(),
        }
    }

    /// Choose a focus quest and start it straight away.
    pub fn start_preset(&mut self, minutes: f64) -> Vec<Event> {
        let mut events = vec![self.choose_quest(QuestMode::Focus, minutes)];
        events.extend(self.start_pause());
        events
    }

    /// Toggle running. Does nothing before a quest is chosen or once the
    /// quest has completed.
    pub fn start_pause(&mut self) -> Option<Event> {
        match self.state() {
            SessionState::Idle | SessionState::Completed => None,
            SessionState::Running => {
                self.running = false;
                debug!(remaining_secs = self.remaining_secs, "session paused");
                Some(Event::SessionPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            SessionState::Ready => {
                self.running = true;
                debug!(mode = %self.mode, "session started");
                Some(Event::SessionStarted {
                    mode: self.mode,
                    duration_secs: self.duration_secs,
                    at: Utc::now(),
                })
            }
            SessionState::Paused => {
                self.running = true;
                debug!(remaining_secs = self.remaining_secs, "session resumed");
                Some(Event::SessionResumed {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
        }
    }

    /// Apply `dt` elapsed seconds. Returns `Some(Event::SessionCompleted)`
    /// exactly once, on the tick that reaches zero.
    pub fn tick(&mut self, dt: f64) -> Option<Event> {
        if !self.running {
            return None;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.remaining_secs = (self.remaining_secs - dt).max(0.0);
        if self.remaining_secs > 0.0 {
            return None;
        }
        self.running = false;
        debug!(mode = %self.mode, "session completed");
        Some(self.completed(true))
    }

    /// Bank a running or paused session now. The session is finished
    /// afterwards and cannot be resumed.
    pub fn end_early(&mut self) -> Option<Event> {
        match self.state() {
            SessionState::Running | SessionState::Paused => {
                let event = self.completed(false);
                self.running = false;
                self.remaining_secs = 0.0;
                debug!(mode = %self.mode, "session banked early");
                Some(event)
            }
            _ => None,
        }
    }

    /// Back to idle with the mode's nominal length.
    pub fn reset(&mut self) -> Event {
        let minutes = match self.mode {
            QuestMode::Focus => (self.duration_secs / 60.0).round(),
            QuestMode::Custom => f64::from(self.custom_mins),
            mode => mode.fixed_minutes().unwrap_or(DEFAULT_FOCUS_MINUTES),
        };
        let secs = quest_seconds(minutes);
        self.duration_secs = secs;
        self.remaining_secs = secs;
        self.running = false;
        self.quest_chosen = false;
        debug!(mode = %self.mode, "session reset");
        Event::SessionReset { at: Utc::now() }
    }

    /// Set the custom quest length, clamped into `[1, 180]`.
    pub fn set_custom_minutes(&mut self, minutes: i64) -> u32 {
        self.custom_mins = clamp_custom_minutes(minutes);
        self.custom_mins
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn completed(&self, full: bool) -> Event {
        Event::SessionCompleted {
            outcome: SessionOutcome {
                mode: self.mode,
                full,
                duration_secs: self.duration_secs,
                elapsed_secs: self.duration_secs - self.remaining_secs,
            },
            at: Utc::now(),
        }
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn round_to_i64(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_focus(minutes: f64) -> SessionEngine {
        let mut engine = SessionEngine::new();
        engine.choose_quest(QuestMode::Focus, minutes);
        engine.start_pause();
        engine
    }

    #[test]
    fn new_engine_is_idle() {
        let engine = SessionEngine::new();
        assert_eq!(engine.state(), SessionState::Idle);
        assert_eq!(engine.duration_secs(), 1200.0);
        assert_eq!(engine.custom_mins(), 45);
    }

    #[test]
    fn configured_defaults() {
        let engine = SessionEngine::with_defaults(25.0, 500);
        assert_eq!(engine.state(), SessionState::Idle);
        assert_eq!(engine.duration_secs(), 1500.0);
        assert_eq!(engine.custom_mins(), 180);
    }

    #[test]
    fn choose_start_pause_resume() {
        let mut engine = SessionEngine::new();
        assert!(engine.start_pause().is_none(), "no quest chosen yet");

        engine.choose_quest(QuestMode::Focus, 5.0);
        assert_eq!(engine.state(), SessionState::Ready);
        assert_eq!(engine.duration_secs(), 300.0);

        assert!(matches!(engine.start_pause(), Some(Event::SessionStarted { .. })));
        assert_eq!(engine.state(), SessionState::Running);

        engine.tick(10.0);
        assert!(matches!(engine.start_pause(), Some(Event::SessionPaused { .. })));
        assert_eq!(engine.state(), SessionState::Paused);

        assert!(matches!(engine.start_pause(), Some(Event::SessionResumed { .. })));
        assert_eq!(engine.state(), SessionState::Running);
    }

    #[test]
    fn breaks_ignore_requested_minutes() {
        let mut engine = SessionEngine::new();
        engine.choose_quest(QuestMode::ShortBreak, 99.0);
        assert_eq!(engine.duration_secs(), 300.0);
        engine.choose_quest(QuestMode::LongBreak, 1.0);
        assert_eq!(engine.duration_secs(), 900.0);
    }

    #[test]
    fn custom_quest_is_clamped_and_remembered() {
        let mut engine = SessionEngine::new();
        engine.choose_quest(QuestMode::Custom, 400.0);
        assert_eq!(engine.duration_secs(), 180.0 * 60.0);
        assert_eq!(engine.custom_mins(), 180);

        engine.choose_quest(QuestMode::Custom, -3.0);
        assert_eq!(engine.duration_secs(), 60.0);
        assert_eq!(engine.custom_mins(), 1);
    }

    #[test]
    fn tick_completes_exactly_once() {
        let mut engine = running_focus(1.0);
        assert!(engine.tick(59.0).is_none());
        let event = engine.tick(5.0);
        match event {
            Some(Event::SessionCompleted { outcome, .. }) => {
                assert!(outcome.full);
                assert_eq!(outcome.elapsed_secs, 60.0);
            }
            other => panic!("expected SessionCompleted, got {other:?}"),
        }
        assert_eq!(engine.remaining_secs(), 0.0);
        assert!(!engine.is_running());
        assert_eq!(engine.state(), SessionState::Completed);
        assert!(engine.tick(5.0).is_none());
        assert!(engine.start_pause().is_none());
    }

    #[test]
    fn negative_and_nan_ticks_do_not_add_time() {
        let mut engine = running_focus(1.0);
        engine.tick(-30.0);
        engine.tick(f64::NAN);
        assert_eq!(engine.remaining_secs(), 60.0);
    }

    #[test]
    fn paused_engine_ignores_ticks() {
        let mut engine = running_focus(1.0);
        engine.start_pause();
        assert!(engine.tick(120.0).is_none());
        assert_eq!(engine.remaining_secs(), 60.0);
    }

    #[test]
    fn end_early_reports_elapsed_and_finishes() {
        let mut engine = running_focus(5.0);
        engine.tick(120.0);
        match engine.end_early() {
            Some(Event::SessionCompleted { outcome, .. }) => {
                assert!(!outcome.full);
                assert_eq!(outcome.elapsed_secs, 120.0);
                assert_eq!(outcome.elapsed_minutes(), 2.0);
                assert_eq!(outcome.planned_minutes(), 5);
            }
            other => panic!("expected SessionCompleted, got {other:?}"),
        }
        assert_eq!(engine.state(), SessionState::Completed);
        assert!(engine.end_early().is_none());
    }

    #[test]
    fn end_early_requires_started_session() {
        let mut engine = SessionEngine::new();
        assert!(engine.end_early().is_none());
        engine.choose_quest(QuestMode::Focus, 5.0);
        assert!(engine.end_early().is_none());
    }

    #[test]
    fn reset_restores_nominal_length() {
        let mut engine = running_focus(30.0);
        engine.tick(100.0);
        engine.reset();
        assert_eq!(engine.state(), SessionState::Idle);
        assert_eq!(engine.remaining_secs(), 1800.0);
        assert_eq!(engine.duration_secs(), 1800.0);

        engine.set_custom_minutes(12);
        engine.choose_quest(QuestMode::ShortBreak, 0.0);
        engine.reset();
        assert_eq!(engine.duration_secs(), 300.0);
    }

    #[test]
    fn start_preset_runs_immediately() {
        let mut engine = SessionEngine::new();
        let events = engine.start_preset(15.0);
        assert_eq!(events.len(), 2);
        assert_eq!(engine.state(), SessionState::Running);
        assert_eq!(engine.mode(), QuestMode::Focus);
    }

    #[test]
    fn restore_never_resumes_and_repairs_numbers() {
        let snapshot = SessionSnapshot {
            mode: QuestMode::Custom,
            running: true,
            duration: 600.0,
            remaining: 900.0,
            custom_mins: 0,
            quest_chosen: true,
        };
        let engine = SessionEngine::from_persisted(&snapshot);
        assert!(!engine.is_running());
        assert_eq!(engine.remaining_secs(), 600.0);
        assert_eq!(engine.custom_mins(), 1);
        assert_eq!(engine.state(), SessionState::Ready);

        let broken = SessionSnapshot {
            duration: -1.0,
            ..snapshot
        };
        let engine = SessionEngine::from_persisted(&broken);
        assert_eq!(engine.duration_secs(), 1200.0);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = SessionEngine::new();
        match engine.snapshot() {
            Event::StateSnapshot {
                state,
                remaining_secs,
                progress,
                ..
            } => {
                assert_eq!(state, SessionState::Idle);
                assert_eq!(remaining_secs, 1200.0);
                assert_eq!(progress, 0.0);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}
