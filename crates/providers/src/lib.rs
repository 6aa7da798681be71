//! Language-model backends for Jarvis.
//!
//! All backends implement the `jarvis_core::Provider` trait.
//! [`selection`] picks one of them once per session and wraps it in a
//! [`ModelHandle`], degrading to the local echo backend when the preferred
//! one cannot be built.

pub mod local;
pub mod openai_compat;
pub mod selection;

pub use local::LocalEchoProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use selection::{ModelHandle, ModelParams, ModelSelection, select, select_from_config};
