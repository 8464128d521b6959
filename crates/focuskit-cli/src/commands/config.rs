use clap::Subcommand;
use focuskit_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value by dotted key (e.g. "timer.frame_ms", "loot.chance")
    Get { key: String },
    /// Change one value and write config.toml
    Set { key: String, value: String },
    /// Print the whole config as JSON
    List,
    /// Overwrite config.toml with defaults
    Reset,
    /// Print where config.toml lives
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or_else(|| format!("unknown config key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            tracing::debug!(%key, %value, "config updated");
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List => {
            println!("{}", serde_json::to_string_pretty(&Config::load()?)?);
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
        ConfigAction::Path => println!("{}", Config::path()?.display()),
    }
    Ok(())
}
