//! Text I/O surfaces for Jarvis.
//!
//! A channel turns user input into [`ChannelMessage`]s and renders replies.
//! The assistant behind it only ever sees text.
//!
//! Available channels:
//! - **CLI** — interactive terminal chat (stdin/stdout)
//! - **Voice** — wake-word gated speech, driven by a pluggable [`SpeechBackend`]
//!
//! [`ChannelMessage`]: jarvis_core::ChannelMessage

pub mod cli;
pub mod voice;

pub use cli::CliChannel;
pub use voice::{SpeechBackend, VoiceChannel};
