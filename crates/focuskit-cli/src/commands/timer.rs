use focuskit_core::storage::Database;
use focuskit_core::{Config, FocusController, QuestMode};
use serde_json::json;

use crate::interactive;

fn open_controller() -> Result<(FocusController, Config), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let controller = FocusController::with_config(Box::new(db), &config);
    Ok((controller, config))
}

/// Enter the interactive timer, optionally starting a quest first.
pub fn run_interactive(quest: Option<(QuestMode, f64)>) -> Result<(), Box<dyn std::error::Error>> {
    let (mut controller, config) = open_controller()?;
    if let Some((mode, minutes)) = quest {
        controller.start_quest(mode, minutes);
    }
    tracing::info!(state = ?controller.state(), "interactive timer opened");
    let outcome = interactive::run(&mut controller, &config);
    close_out(&controller, outcome)?;
    tracing::info!(state = ?controller.state(), "interactive timer closed");
    Ok(())
}

/// Save everything before reporting how the interactive loop ended.
fn close_out(
    controller: &FocusController,
    outcome: std::io::Result<()>,
) -> Result<(), Box<dyn std::error::Error>> {
    let saved = controller.save();
    if let Err(e) = &outcome {
        tracing::error!(error = %e, "interactive timer failed");
    }
    outcome?;
    saved?;
    Ok(())
}

pub fn status() -> Result<(), Box<dyn std::error::Error>> {
    let (controller, _) = open_controller()?;
    let engine = controller.engine();
    let out = json!({
        "session": {
            "state": engine.state(),
            "mode": engine.mode(),
            "durationSecs": engine.duration_secs(),
            "remainingSecs": engine.remaining_secs(),
            "progress": engine.progress(),
            "customMins": engine.custom_mins(),
        },
        "progression": controller.progression(),
        "settings": controller.settings(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

pub fn reset() -> Result<(), Box<dyn std::error::Error>> {
    let (mut controller, _) = open_controller()?;
    for event in controller.reset() {
        println!("{}", serde_json::to_string_pretty(&event)?);
    }
    Ok(())
}
