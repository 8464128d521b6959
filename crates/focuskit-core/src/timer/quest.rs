use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Shortest quest a user can commit to, in minutes.
pub const MIN_QUEST_MINUTES: f64 = 1.0;
/// Longest quest a user can commit to, in minutes.
pub const MAX_QUEST_MINUTES: f64 = 180.0;

pub const SHORT_BREAK_MINUTES: f64 = 5.0;
pub const LONG_BREAK_MINUTES: f64 = 15.0;
pub const DEFAULT_FOCUS_MINUTES: f64 = 20.0;
pub const DEFAULT_CUSTOM_MINUTES: u32 = 45;
pub const BONUS_ROUND_MINUTES: f64 = 5.0;

/// The four one-key presets (digits 1-4).
pub const DEFAULT_PRESETS: [u32; 4] = [5, 10, 15, 30];

/// Kind of session the user committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestMode {
    #[serde(rename = "focus")]
    Focus,
    #[serde(rename = "short")]
    ShortBreak,
    #[serde(rename = "long")]
    LongBreak,
    #[serde(rename = "custom")]
    Custom,
}

impl QuestMode {
    pub fn label(self) -> &'static str {
        match self {
            QuestMode::Focus => "Focus Session",
            QuestMode::ShortBreak => "Short Break",
            QuestMode::LongBreak => "Long Break",
            QuestMode::Custom => "Custom Session",
        }
    }

    /// Breaks have a fixed length; focus and custom quests take explicit minutes.
    pub fn fixed_minutes(self) -> Option<f64> {
        match self {
            QuestMode::ShortBreak => Some(SHORT_BREAK_MINUTES),
            QuestMode::LongBreak => Some(LONG_BREAK_MINUTES),
            QuestMode::Focus | QuestMode::Custom => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            QuestMode::Focus => "focus",
            QuestMode::ShortBreak => "short",
            QuestMode::LongBreak => "long",
            QuestMode::Custom => "custom",
        }
    }
}

impl fmt::Display for QuestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for QuestMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focus" => Ok(QuestMode::Focus),
            "short" | "short-break" => Ok(QuestMode::ShortBreak),
            "long" | "long-break" => Ok(QuestMode::LongBreak),
            "custom" => Ok(QuestMode::Custom),
            other => Err(ValidationError::InvalidValue {
                field: "mode".into(),
                message: format!("expected focus, short, long or custom, got '{other}'"),
            }),
        }
    }
}

/// Clamp user-entered minutes into `[1, 180]`. Non-finite input becomes the minimum.
pub fn clamp_minutes(minutes: f64) -> f64 {
    if !minutes.is_finite() {
        return MIN_QUEST_MINUTES;
    }
    minutes.clamp(MIN_QUEST_MINUTES, MAX_QUEST_MINUTES)
}

/// Whole-minute variant used for the custom quest length.
pub fn clamp_custom_minutes(minutes: i64) -> u32 {
    minutes.clamp(MIN_QUEST_MINUTES as i64, MAX_QUEST_MINUTES as i64) as u32
}

/// Session length in seconds for the given minutes, never below one second.
pub fn quest_seconds(minutes: f64) -> f64 {
    (clamp_minutes(minutes) * 60.0).round().max(1.0)
}
