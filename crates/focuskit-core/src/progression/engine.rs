//! Reward computation for a finished session.
//!
//! Everything here is pure: the caller supplies the prior [`Progression`],
//! the [`SessionOutcome`] and a single "today" snapshot, and gets back the
//! next progression plus what changed. The XP bonus and the streak update
//! read the same `today`, so a session that straddles midnight is judged
//! consistently.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::state::{Achievement, Progression};
use crate::timer::{QuestMode, SessionOutcome};

/// Flat XP bonus for a focus session.
pub const FOCUS_BONUS_XP: u32 = 5;
/// Streak length at which the bonus stops growing (+50%).
pub const MAX_BONUS_STREAK: u32 = 5;
/// Sessions in one day for `five-today`.
pub const FIVE_TODAY_SESSIONS: u32 = 5;
/// Planned focus length counted toward `triple-30`.
pub const THIRTY_MINUTE_QUEST: u32 = 30;
/// 30-minute focus sessions in one day for `triple-30`.
pub const TRIPLE_THIRTY_SESSIONS: u32 = 3;

/// Result of rewarding one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    pub progression: Progression,
    /// XP awarded, before level rollover.
    pub gained: u32,
    pub leveled_up: bool,
    pub levels_gained: u32,
    /// Achievements unlocked by this session only.
    pub unlocked: Vec<Achievement>,
}

/// XP for a session of `elapsed_minutes` with the given same-day streak.
pub fn xp_for(mode: QuestMode, elapsed_minutes: f64, streak: u32) -> u32 {
    let minutes = if elapsed_minutes.is_finite() {
        elapsed_minutes.max(0.0).round()
    } else {
        0.0
    };
    let mut base = (minutes as u32).max(1);
    if mode == QuestMode::Focus {
        base += FOCUS_BONUS_XP;
    }
    let multiplier = 1.0 + 0.1 * f64::from(streak.min(MAX_BONUS_STREAK));
    (f64::from(base) * multiplier).round() as u32
}

/// Reward a finished session.
pub fn grant(current: &Progression, outcome: &SessionOutcome, today: NaiveDate) -> Grant {
    let same_day = current.last_session_date == Some(today);
    let gained = xp_for(
        outcome.mode,
        outcome.elapsed_minutes(),
        current.streak_for(today),
    );

    let mut next = current.clone();
    let levels_gained = next.add_xp(gained);

    next.daily_streak = if same_day {
        current.daily_streak + 1
    } else {
        1
    };
    next.best_streak = current.best_streak.max(next.daily_streak);

    let thirty_minute_focus =
        outcome.mode == QuestMode::Focus && outcome.planned_minutes() == THIRTY_MINUTE_QUEST;
    next.count_thirty_today = match (thirty_minute_focus, same_day) {
        (true, true) => current.count_thirty_today + 1,
        (true, false) => 1,
        (false, true) => current.count_thirty_today,
        (false, false) => 0,
    };
    next.last_session_date = Some(today);

    let earned = [
        (Achievement::FirstSession, true),
        (
            Achievement::FiveToday,
            next.daily_streak >= FIVE_TODAY_SESSIONS,
        ),
        (
            Achievement::Triple30,
            next.count_thirty_today >= TRIPLE_THIRTY_SESSIONS,
        ),
    ];
    let mut unlocked = Vec::new();
    for (achievement, _) in earned.into_iter().filter(|(_, hit)| *hit) {
        if next.achievements.insert(achievement) {
            unlocked.push(achievement);
        }
    }

    Grant {
        progression: next,
        gained,
        leveled_up: levels_gained > 0,
        levels_gained,
        unlocked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    fn focus(planned_min: f64, elapsed_min: f64) -> SessionOutcome {
        SessionOutcome {
            mode: QuestMode::Focus,
            full: planned_min == elapsed_min,
            duration_secs: planned_min * 60.0,
            elapsed_secs: elapsed_min * 60.0,
        }
    }

    #[test]
    fn xp_formula() {
        assert_eq!(xp_for(QuestMode::Focus, 2.0, 0), 7);
        assert_eq!(xp_for(QuestMode::Focus, 2.0, 1), 8); // 7.7
        assert_eq!(xp_for(QuestMode::ShortBreak, 5.0, 5), 8); // 7.5 rounds up
        assert_eq!(xp_for(QuestMode::Custom, 0.1, 0), 1);
        assert_eq!(xp_for(QuestMode::Focus, 30.0, 12), 53); // capped at +50%
    }

    #[test]
    fn first_session_of_the_day() {
        let g = grant(&Progression::default(), &focus(5.0, 5.0), day(1));
        assert_eq!(g.gained, 10);
        assert_eq!(g.progression.xp, 10);
        assert_eq!(g.progression.daily_streak, 1);
        assert_eq!(g.progression.best_streak, 1);
        assert_eq!(g.progression.last_session_date, Some(day(1)));
        assert_eq!(g.unlocked, vec![Achievement::FirstSession]);
        assert!(!g.leveled_up);
    }

    #[test]
    fn same_day_streak_boosts_xp() {
        let prior = Progression {
            daily_streak: 3,
            best_streak: 3,
            last_session_date: Some(day(1)),
            ..Progression::default()
        };
        let g = grant(&prior, &focus(10.0, 10.0), day(1));
        assert_eq!(g.gained, 20); // 15 * 1.3 = 19.5
        assert_eq!(g.progression.daily_streak, 4);
        assert_eq!(g.progression.best_streak, 4);
    }

    #[test]
    fn new_day_resets_streak_without_bonus() {
        let prior = Progression {
            daily_streak: 7,
            best_streak: 7,
            last_session_date: Some(day(1)),
            ..Progression::default()
        };
        let g = grant(&prior, &focus(10.0, 10.0), day(2));
        assert_eq!(g.gained, 15);
        assert_eq!(g.progression.daily_streak, 1);
        assert_eq!(g.progression.best_streak, 7);
    }

    #[test]
    fn level_up_rollover() {
        let prior = Progression {
            xp: 95,
            ..Progression::default()
        };
        let g = grant(&prior, &focus(5.0, 5.0), day(1));
        assert!(g.leveled_up);
        assert_eq!(g.levels_gained, 1);
        assert_eq!(g.progression.level, 2);
        assert_eq!(g.progression.xp, 5);
    }

    #[test]
    fn five_today_unlocks_on_fifth_session() {
        let prior = Progression {
            daily_streak: 4,
            best_streak: 4,
            last_session_date: Some(day(3)),
            ..Progression::default()
        };
        let g = grant(&prior, &focus(5.0, 5.0), day(3));
        assert!(g.unlocked.contains(&Achievement::FiveToday));
    }

    #[test]
    fn only_thirty_minute_focus_counts_toward_triple() {
        let prior = Progression {
            count_thirty_today: 2,
            daily_streak: 2,
            last_session_date: Some(day(4)),
            ..Progression::default()
        };
        let mut custom = focus(30.0, 30.0);
        custom.mode = QuestMode::Custom;
        let g = grant(&prior, &custom, day(4));
        assert_eq!(g.progression.count_thirty_today, 2);
        assert!(!g.progression.has(Achievement::Triple30));

        let g = grant(&prior, &focus(30.0, 30.0), day(4));
        assert_eq!(g.progression.count_thirty_today, 3);
        assert!(g.unlocked.contains(&Achievement::Triple30));
    }

    #[test]
    fn thirty_counter_resets_on_new_day() {
        let prior = Progression {
            count_thirty_today: 2,
            last_session_date: Some(day(4)),
            ..Progression::default()
        };
        let g = grant(&prior, &focus(10.0, 10.0), day(5));
        assert_eq!(g.progression.count_thirty_today, 0);
        let g = grant(&prior, &focus(30.0, 12.0), day(5));
        assert_eq!(g.progression.count_thirty_today, 1);
    }

    #[test]
    fn achievements_never_disappear() {
        let mut prior = Progression::default();
        prior.achievements.insert(Achievement::FiveToday);
        prior.achievements.insert(Achievement::Triple30);
        let g = grant(&prior, &focus(5.0, 1.0), day(9));
        assert!(g.progression.has(Achievement::FiveToday));
        assert!(g.progression.has(Achievement::Triple30));
        assert!(g.progression.has(Achievement::FirstSession));
        assert_eq!(g.unlocked, vec![Achievement::FirstSession]);
    }

    #[test]
    fn grant_does_not_touch_input() {
        let prior = Progression::default();
        let before = prior.clone();
        let _ = grant(&prior, &focus(5.0, 5.0), day(1));
        assert_eq!(prior, before);
    }
}
