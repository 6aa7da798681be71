//! The Jarvis assistant core.
//!
//! [`nlu`] turns raw utterances into intents; [`assistant`] routes them to
//! skills or the model backend and keeps the rolling conversation;
//! [`session`] connects an assistant to a text channel.

pub mod assistant;
pub mod nlu;
pub mod session;

pub use assistant::{Assistant, SessionState};
pub use nlu::{IntentClassifier, IntentRule};
pub use session::converse;

use jarvis_config::ConfigError;
use jarvis_core::error::SkillError;

/// Errors that prevent an assistant from being built.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Skill loading failed: {0}")]
    Skill(#[from] SkillError),

    #[error("Invalid intent rule '{intent}': {reason}")]
    InvalidRule { intent: String, reason: String },

    #[error("Failed to prepare data directories: {0}")]
    DataDir(#[from] std::io::Error),
}
