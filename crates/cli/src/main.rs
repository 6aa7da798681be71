//! Jarvis CLI — the main entry point.
//!
//! Commands:
//! - `agent`    — Interactive chat or single-message mode (default)
//! - `onboard`  — Write a default config and create data directories
//! - `doctor`   — Diagnose configuration, credentials, backend and skills
//! - `config`   — Show, locate or validate the configuration
//! - `skills`   — List loaded skills in precedence order

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "jarvis",
    about = "Jarvis — a conversational assistant with skills and a language model fallback",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the config file (defaults to $JARVIS_CONFIG, then ~/.jarvis/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with Jarvis
    Agent {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Talk to Jarvis by voice
        #[arg(long)]
        voice: bool,

        /// Wake word for voice mode
        #[arg(long)]
        wake_word: Option<String>,
    },

    /// Initialize configuration and data directories
    Onboard,

    /// Diagnose system health
    Doctor,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// List the loaded skills
    Skills,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (credential redacted)
    Show,
    /// Print the config file location
    Path,
    /// Validate the configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let command = cli.command.unwrap_or(Commands::Agent {
        message: None,
        voice: false,
        wake_word: None,
    });

    tracing::debug!(config = ?config, "Jarvis starting");

    match command {
        Commands::Agent {
            message,
            voice,
            wake_word,
        } => commands::agent::run(config, message, voice, wake_word).await?,
        Commands::Onboard => commands::onboard::run(config).await?,
        Commands::Doctor => commands::doctor::run(config).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(config).await?,
            ConfigAction::Path => commands::config_cmd::path(config).await?,
            ConfigAction::Validate => commands::config_cmd::validate(config).await?,
        },
        Commands::Skills => commands::skills::run(config).await?,
    }

    Ok(())
}
