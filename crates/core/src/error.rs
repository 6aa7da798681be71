//! Error types for the Jarvis domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the agent crate aggregates
//! them for startup.

use thiserror::Error;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Missing credential for provider '{0}'")]
    MissingCredential(String),

    #[error("Unknown model provider '{0}'")]
    UnknownProvider(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Skill loading and execution errors.
///
/// Loading errors are fatal at startup. Execution errors never leave a skill:
/// they are turned into a reply inside `Skill::handle`.
#[derive(Debug, Error)]
pub enum SkillError {
    #[error("Unknown skill '{0}'")]
    UnknownSkill(String),

    #[error("Malformed skill identifier '{0}'")]
    MalformedIdentifier(String),

    #[error("Skill '{skill}' failed to initialise: {reason}")]
    InitFailed { skill: String, reason: String },

    #[error("Skill '{skill}' failed: {reason}")]
    ExecutionFailed { skill: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel not available: {0}")]
    Unavailable(String),

    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),

    #[error("Message delivery failed on {channel}: {reason}")]
    DeliveryFailed { channel: String, reason: String },
}
