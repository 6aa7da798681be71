//! `jarvis config` — Configuration management commands.

use std::path::Path;

use jarvis_config::AppConfig;

use super::load_config;

pub async fn validate(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    match AppConfig::load(config_path) {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();

            if !config.has_api_key() && config.model.provider != "local-echo" {
                warnings.push("No API key set (set OPENAI_API_KEY or OPENROUTER_API_KEY env var)");
            }

            if config.skills.is_empty() {
                warnings.push("No skills enabled; every request goes to the model backend");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Provider:  {}", config.model.provider);
            println!("   Model:     {}", config.model.model);
            println!("   History:   {} turns", config.memory.conversation_history);
            println!("   Skills:    {}", config.skills.join(", "));
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    println!("{}", render(&config)?);
    Ok(())
}

pub async fn path(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::resolve_path(config_path).display());
    Ok(())
}

/// The effective configuration as TOML, with the credential masked.
fn render(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.api_key.is_some() {
        shown.api_key = Some("***".into());
    }
    toml::to_string_pretty(&shown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_masks_credential() {
        let mut config = AppConfig::default();
        config.api_key = Some("sk-secret".into());
        let out = render(&config).unwrap();
        assert!(!out.contains("sk-secret"));
        assert!(out.contains("api_key = \"***\""));
        assert!(out.contains("[model]"));
    }

    #[test]
    fn explicit_path_wins() {
        let path = AppConfig::resolve_path(Some(Path::new("/tmp/jarvis-test.toml")));
        assert_eq!(path, Path::new("/tmp/jarvis-test.toml"));
    }
}
