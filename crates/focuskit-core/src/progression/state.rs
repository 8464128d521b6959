use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Unlockable badges. Ids are the stable kebab-case strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Achievement {
    /// Any session completed or banked.
    #[serde(rename = "first-session")]
    FirstSession,
    /// Five sessions on one day.
    #[serde(rename = "five-today")]
    FiveToday,
    /// Three 30-minute focus sessions on one day.
    #[serde(rename = "triple-30")]
    Triple30,
}

impl Achievement {
    pub fn id(self) -> &'static str {
        match self {
            Achievement::FirstSession => "first-session",
            Achievement::FiveToday => "five-today",
            Achievement::Triple30 => "triple-30",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Achievement::FirstSession => "First Session",
            Achievement::FiveToday => "Five Today",
            Achievement::Triple30 => "3x30 Focus",
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Highest level a stored blob may claim before it is treated as corrupt.
pub const MAX_LEVEL: u32 = 100_000;

/// XP required to clear `level`: 100 for level 1, then 50 more per level.
pub fn level_cap(level: u32) -> u32 {
    level
        .max(1)
        .saturating_sub(1)
        .saturating_mul(50)
        .saturating_add(100)
}

/// Persisted gamification state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Progression {
    /// XP within the current level, always below `level_cap(level)` at rest.
    pub xp: u32,
    pub level: u32,
    /// Sessions completed on `last_session_date`.
    pub daily_streak: u32,
    pub best_streak: u32,
    pub last_session_date: Option<NaiveDate>,
    pub achievements: BTreeSet<Achievement>,
    #[serde(rename = "count30Today")]
    pub count_thirty_today: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            daily_streak: 0,
            best_streak: 0,
            last_session_date: None,
            achievements: BTreeSet::new(),
            count_thirty_today: 0,
        }
    }
}

impl Progression {
    pub fn level_cap(&self) -> u32 {
        level_cap(self.level)
    }

    pub fn xp_to_next_level(&self) -> u32 {
        self.level_cap().saturating_sub(self.xp)
    }

    /// 0.0 .. 100.0 progress through the current level.
    pub fn level_progress_pct(&self) -> f64 {
        f64::from(self.xp.min(self.level_cap())) / f64::from(self.level_cap()) * 100.0
    }

    pub fn has(&self, achievement: Achievement) -> bool {
        self.achievements.contains(&achievement)
    }

    /// Streak counted toward the XP bonus of a session finished on `today`.
    pub fn streak_for(&self, today: NaiveDate) -> u32 {
        if self.last_session_date == Some(today) {
            self.daily_streak
        } else {
            0
        }
    }

    /// Multiplier the next session finished on `today` would earn.
    pub fn streak_multiplier_for(&self, today: NaiveDate) -> f64 {
        1.0 + 0.1 * f64::from(self.streak_for(today).min(super::MAX_BONUS_STREAK))
    }

    /// Add XP and roll over into as many levels as it covers. Returns the
    /// number of levels gained.
    pub fn add_xp(&mut self, gained: u32) -> u32 {
        self.xp = self.xp.saturating_add(gained);
        let mut levels = 0;
        while self.xp >= level_cap(self.level) {
            self.xp -= level_cap(self.level);
            self.level = self.level.saturating_add(1);
            levels += 1;
        }
        levels
    }

    /// Repair a loaded snapshot so the at-rest invariants hold.
    pub fn normalized(mut self) -> Self {
        if self.level > MAX_LEVEL {
            tracing::warn!(level = self.level, "implausible stored level, resetting progression");
            return Self::default();
        }
        self.level = self.level.max(1);
        self.add_xp(0);
        self.best_streak = self.best_streak.max(self.daily_streak);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_caps_grow_linearly() {
        assert_eq!(level_cap(1), 100);
        assert_eq!(level_cap(2), 150);
        assert_eq!(level_cap(5), 300);
        assert_eq!(level_cap(0), 100);
    }

    #[test]
    fn add_xp_rolls_over() {
        let mut p = Progression {
            xp: 95,
            ..Progression::default()
        };
        assert_eq!(p.add_xp(10), 1);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 5);
    }

    #[test]
    fn add_xp_can_cross_several_levels() {
        let mut p = Progression::default();
        assert_eq!(p.add_xp(100 + 150 + 20), 2);
        assert_eq!(p.level, 3);
        assert_eq!(p.xp, 20);
    }

    #[test]
    fn progress_views() {
        let p = Progression {
            xp: 75,
            level: 2,
            ..Progression::default()
        };
        assert_eq!(p.xp_to_next_level(), 75);
        assert_eq!(p.level_progress_pct(), 50.0);
    }

    #[test]
    fn normalized_repairs_loaded_state() {
        let p = Progression {
            xp: 260,
            level: 0,
            daily_streak: 4,
            best_streak: 2,
            ..Progression::default()
        }
        .normalized();
        assert_eq!(p.level, 3);
        assert_eq!(p.xp, 10);
        assert_eq!(p.best_streak, 4);
    }

    #[test]
    fn level_cap_saturates_instead_of_overflowing() {
        assert_eq!(level_cap(u32::MAX), u32::MAX);
        assert_eq!(level_cap(MAX_LEVEL), 100 + (MAX_LEVEL - 1) * 50);
    }

    #[test]
    fn implausible_level_falls_back_to_defaults() {
        let p = Progression {
            xp: 5,
            level: u32::MAX,
            ..Progression::default()
        }
        .normalized();
        assert_eq!(p, Progression::default());
    }

    #[test]
    fn serializes_with_stable_keys() {
        let mut p = Progression::default();
        p.achievements.insert(Achievement::Triple30);
        p.last_session_date = NaiveDate::from_ymd_opt(2026, 1, 2);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["achievements"][0], "triple-30");
        assert_eq!(json["lastSessionDate"], "2026-01-02");
        assert_eq!(json["count30Today"], 0);
        assert_eq!(json["dailyStreak"], 0);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let p: Progression = serde_json::from_str(r#"{"xp": 12}"#).unwrap();
        assert_eq!(p.xp, 12);
        assert_eq!(p.level, 1);
        assert!(p.achievements.is_empty());
    }
}
