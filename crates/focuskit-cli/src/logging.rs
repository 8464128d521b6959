use std::fs::OpenOptions;
use std::sync::Mutex;

use focuskit_core::storage::data_dir;
use focuskit_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. `FOCUSKIT_LOG` wins over the config's
/// `logging.filter`. The interactive timer logs to `<data_dir>/focuskit.log`
/// so output does not tear the screen.
pub fn init(to_file: bool) {
    let filter = EnvFilter::try_from_env("FOCUSKIT_LOG").unwrap_or_else(|_| {
        let configured = Config::load_or_default().logging.filter;
        EnvFilter::try_new(&configured).unwrap_or_else(|_| EnvFilter::new("warn"))
    });
    let registry = tracing_subscriber::registry().with(filter);

    if to_file {
        let file = data_dir().ok().and_then(|dir| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("focuskit.log"))
                .ok()
        });
        if let Some(file) = file {
            let _ = registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init();
            return;
        }
    }

    let _ = registry
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
