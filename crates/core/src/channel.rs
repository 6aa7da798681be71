//! Channel trait — the abstraction over text I/O surfaces.
//!
//! A Channel delivers user utterances to the assistant and renders replies.
//! The assistant itself never knows whether text was typed or spoken.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use crate::error::ChannelError;

/// An utterance received from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// Name of the channel that produced this message
    pub channel: String,

    /// The text content
    pub content: String,

    /// When the utterance was captured
    pub received_at: DateTime<Utc>,
}

impl ChannelMessage {
    pub fn new(channel: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            content: content.into(),
            received_at: Utc::now(),
        }
    }
}

/// The core Channel trait.
#[async_trait]
pub trait Channel: Send + Sync {
    /// The channel name (e.g., "cli", "voice").
    fn name(&self) -> &str;

    /// Start receiving utterances. The receiver closes when the user ends
    /// the session (EOF, exit command, ...).
    async fn start(
        &self,
    ) -> std::result::Result<mpsc::Receiver<std::result::Result<ChannelMessage, ChannelError>>, ChannelError>;

    /// Render a reply to the user.
    async fn send(&self, content: &str) -> std::result::Result<(), ChannelError>;
}
