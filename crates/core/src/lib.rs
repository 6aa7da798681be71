//! # Jarvis Core
//!
//! Domain types, traits, and error definitions for the Jarvis assistant.
//! This crate has **no framework dependencies**: it defines the domain model
//! that the satellite crates implement against.
//!
//! ## Design Philosophy
//!
//! Every seam is a trait here. Implementations live in their respective crates:
//! - `Skill` implementations in `jarvis-skills`
//! - `Provider` implementations in `jarvis-providers`
//! - `Channel` implementations in `jarvis-channels`
//!
//! The orchestrator in `jarvis-agent` only ever talks to these traits.

pub mod error;
pub mod message;
pub mod context;
pub mod intent;
pub mod provider;
pub mod skill;
pub mod channel;

// Re-export key types at crate root for ergonomics
pub use error::{ChannelError, ProviderError, SkillError};
pub use message::{Message, Role};
pub use context::ConversationContext;
pub use intent::Intent;
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use skill::{Skill, SkillRegistry};
pub use channel::{Channel, ChannelMessage};
