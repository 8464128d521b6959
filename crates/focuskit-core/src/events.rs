use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progression::Achievement;
use crate::timer::{QuestMode, SessionOutcome, SessionState};

/// Every state change in the system produces an Event.
/// The front end renders them; alerts and persistence react to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    QuestChosen {
        mode: QuestMode,
        duration_secs: f64,
        at: DateTime<Utc>,
    },
    SessionStarted {
        mode: QuestMode,
        duration_secs: f64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        remaining_secs: f64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        remaining_secs: f64,
        at: DateTime<Utc>,
    },
    /// Raised once per session, either naturally (`outcome.full`) or by
    /// banking early.
    SessionCompleted {
        outcome: SessionOutcome,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    XpGranted {
        gained: u32,
        xp: u32,
        level: u32,
        at: DateTime<Utc>,
    },
    LevelUp {
        level: u32,
        levels_gained: u32,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        achievement: Achievement,
        at: DateTime<Utc>,
    },
    /// Cosmetic reward; has no effect on XP.
    Loot {
        item: String,
        at: DateTime<Utc>,
    },
    /// The session was banked early; carries the XP actually awarded.
    PartialXpBanked {
        gained: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        mode: QuestMode,
        remaining_secs: f64,
        duration_secs: f64,
        progress: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short type name, as written in the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::QuestChosen { .. } => "QuestChosen",
            Event::SessionStarted { .. } => "SessionStarted",
            Event::SessionPaused { .. } => "SessionPaused",
            Event::SessionResumed { .. } => "SessionResumed",
            Event::SessionCompleted { .. } => "SessionCompleted",
            Event::SessionReset { .. } => "SessionReset",
            Event::XpGranted { .. } => "XpGranted",
            Event::LevelUp { .. } => "LevelUp",
            Event::AchievementUnlocked { .. } => "AchievementUnlocked",
            Event::Loot { .. } => "Loot",
            Event::PartialXpBanked { .. } => "PartialXpBanked",
            Event::StateSnapshot { .. } => "StateSnapshot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = Event::PartialXpBanked {
            gained: 7,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
        assert_eq!(json["gained"], 7);
    }
}
