pub mod config;
pub mod progress;
pub mod settings;
pub mod stats;
pub mod timer;
