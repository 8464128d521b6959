use chrono::Local;
use focuskit_core::storage::{Database, PersistenceGateway};
use serde_json::json;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let p = db.load_progression();
    let today = Local::now().date_naive();

    let achievements: Vec<_> = p
        .achievements
        .iter()
        .map(|a| json!({ "id": a.id(), "title": a.title() }))
        .collect();
    let out = json!({
        "level": p.level,
        "xp": p.xp,
        "levelCap": p.level_cap(),
        "xpToNextLevel": p.xp_to_next_level(),
        "levelProgressPct": p.level_progress_pct(),
        "dailyStreak": p.streak_for(today),
        "bestStreak": p.best_streak,
        "streakMultiplier": p.streak_multiplier_for(today),
        "lastSessionDate": p.last_session_date,
        "achievements": achievements,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
