mod clock;
mod engine;
mod quest;

pub use clock::{
    Calendar, ClockDriver, FixedCalendar, LocalCalendar, ManualClock, SystemClock, TimeSource,
};
pub use engine::{SessionEngine, SessionOutcome, SessionSnapshot, SessionState};
pub use quest::{
    clamp_custom_minutes, clamp_minutes, quest_seconds, QuestMode, BONUS_ROUND_MINUTES,
    DEFAULT_CUSTOM_MINUTES, DEFAULT_FOCUS_MINUTES, DEFAULT_PRESETS, LONG_BREAK_MINUTES,
    MAX_QUEST_MINUTES, MIN_QUEST_MINUTES, SHORT_BREAK_MINUTES,
};
