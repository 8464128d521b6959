//! XP, levels, same-day streaks, achievements and loot.

mod engine;
mod loot;
mod state;

pub use engine::{
    grant, xp_for, Grant, FIVE_TODAY_SESSIONS, FOCUS_BONUS_XP, MAX_BONUS_STREAK,
    THIRTY_MINUTE_QUEST, TRIPLE_THIRTY_SESSIONS,
};
pub use loot::{default_loot_items, loot_rng, LootTable, DEFAULT_LOOT_CHANCE};
pub use state::{level_cap, Achievement, Progression, MAX_LEVEL};
