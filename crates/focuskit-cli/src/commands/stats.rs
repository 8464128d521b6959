use clap::Subcommand;
use focuskit_core::storage::Database;
use serde::Serialize;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Sessions finished since local midnight
    Today,
    /// Every recorded session
    All,
    /// Last few sessions, newest first
    Recent {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        StatsAction::Today => print_json(&db.stats_today()?),
        StatsAction::All => print_json(&db.stats_all()?),
        StatsAction::Recent { limit } => print_json(&db.recent_sessions(limit)?),
    }
}
