//! Subcommand implementations.

pub mod agent;
pub mod config_cmd;
pub mod doctor;
pub mod onboard;
pub mod skills;

use std::path::Path;

use jarvis_config::AppConfig;

/// Load the configuration, turning errors into a message for the user.
pub(crate) fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    AppConfig::load(path).map_err(|e| format!("Failed to load config: {e}").into())
}
