use clap::Subcommand;
use focuskit_core::storage::{Database, PersistenceGateway};
use focuskit_core::Settings;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a setting (e.g. "sound_on", "theme_mode")
    Get { key: String },
    /// Change a setting
    Set { key: String, value: String },
    /// Print all settings as JSON
    List,
    /// Restore default settings
    Reset,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        SettingsAction::Get { key } => match db.load_settings().get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown setting: {key}").into()),
        },
        SettingsAction::Set { key, value } => {
            let mut settings = db.load_settings();
            settings.set(&key, &value)?;
            db.save_settings(&settings)?;
            println!("ok");
        }
        SettingsAction::List => {
            println!("{}", serde_json::to_string_pretty(&db.load_settings())?);
        }
        SettingsAction::Reset => {
            db.save_settings(&Settings::default())?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
