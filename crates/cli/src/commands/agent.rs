//! `jarvis agent` — Interactive or single-message chat mode.

use std::path::Path;

use jarvis_agent::Assistant;
use jarvis_agent::session::RESET_COMMAND;
use jarvis_channels::CliChannel;
use jarvis_core::channel::Channel;
use tracing::{info, warn};

use super::load_config;

pub async fn run(
    config_path: Option<&Path>,
    message: Option<String>,
    voice: bool,
    wake_word: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let mut assistant = Assistant::from_config(&config)?;
    let channel = CliChannel::new();

    if let Some(msg) = message {
        // Single message mode
        let reply = assistant.handle_text(&msg).await;
        channel.send(&reply).await?;
        return Ok(());
    }

    if voice || config.audio.enable_voice {
        let wake_word = wake_word
            .or_else(|| config.audio.wake_word.clone())
            .unwrap_or_else(|| "jarvis".into());
        warn!(wake_word = %wake_word, "No speech backend available, using text mode");
        eprintln!(
            "Voice mode is unavailable: this build has no speech backend (wake word '{}'). \
             Falling back to text mode.",
            wake_word.to_lowercase()
        );
    }

    // Interactive mode
    let model = assistant.model();
    println!();
    println!("  {} is ready.", config.name);
    println!(
        "  Backend:  {}{}",
        model.provider_name(),
        if model.is_fallback() { " (fallback)" } else { "" }
    );
    println!("  Model:    {}", model.params().model);
    println!("  Skills:   {}", assistant.skill_names().join(", "));
    println!();
    println!("  Type your request and press Enter. '{RESET_COMMAND}' clears the conversation.");
    println!("  Type 'exit' or press Ctrl+D to quit.");
    println!();

    let handled = jarvis_agent::converse(&mut assistant, &channel)
        .await
        .map_err(|e| format!("Channel error: {e}"))?;
    info!(session = %assistant.session_id(), handled, "Session ended");

    println!();
    println!("  Goodbye.");
    Ok(())
}
