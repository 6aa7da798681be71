//! `jarvis onboard` — First-time setup.

use std::path::Path;

use jarvis_config::AppConfig;

const SAMPLE_KNOWLEDGE: &str = r#"{
  "jarvis": "Just A Rather Very Intelligent System, at your service.",
  "arc reactor": "A compact fusion power source designed by Tony Stark."
}
"#;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::resolve_path(config_path);

    println!("Jarvis — First-Time Setup");
    println!("=========================\n");

    if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("  Created config directory: {}", dir.display());
        } else {
            println!("  Config directory exists: {}", dir.display());
        }
    }

    if config_path.exists() {
        println!("  Config already exists at: {}", config_path.display());
        println!("  Edit it manually or delete it and re-run onboard.");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("  Created config at: {}", config_path.display());
    }

    let config = AppConfig::load(Some(&config_path))?;
    config.ensure_data_dirs()?;
    println!(
        "  Task list:      {}",
        config.memory.persistent_tasks_path.display()
    );

    let knowledge_path = config.memory.knowledge_path();
    if !knowledge_path.exists() {
        std::fs::write(&knowledge_path, SAMPLE_KNOWLEDGE)?;
        println!("  Created sample knowledge base: {}", knowledge_path.display());
    } else {
        println!("  Knowledge base: {}", knowledge_path.display());
    }

    println!();
    if config.has_api_key() {
        println!("  Credential found. Run `jarvis agent` to start chatting.");
    } else {
        println!("  Next steps:");
        println!("    1. Set OPENAI_API_KEY (or add api_key to the config file)");
        println!("    2. Run: jarvis agent");
        println!("  Without a credential Jarvis answers in fallback mode.");
    }
    println!();

    Ok(())
}
