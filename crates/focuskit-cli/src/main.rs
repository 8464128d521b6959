use clap::{Parser, Subcommand};
use focuskit_core::QuestMode;

mod commands;
mod interactive;
mod logging;

#[derive(Parser)]
#[command(name = "focuskit", version, about = "Focuskit: a gamified focus timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal timer
    Run,
    /// Choose a quest and start the interactive timer with it running
    Quest {
        /// Quest length in minutes (ignored for breaks)
        minutes: f64,
        /// focus, short, long or custom
        #[arg(long, default_value = "focus")]
        mode: QuestMode,
    },
    /// Print the stored session, progression and settings as JSON
    Status,
    /// Level, XP, streaks and achievements
    Progress,
    /// Reset the stored session to idle
    Reset,
    /// Session history statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// User settings (sound, notifications, theme, auto-start)
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Application configuration (config.toml)
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, Commands::Run | Commands::Quest { .. });
    logging::init(interactive);

    let result = match cli.command {
        Commands::Run => commands::timer::run_interactive(None),
        Commands::Quest { minutes, mode } => commands::timer::run_interactive(Some((mode, minutes))),
        Commands::Status => commands::timer::status(),
        Commands::Progress => commands::progress::run(),
        Commands::Reset => commands::timer::reset(),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
