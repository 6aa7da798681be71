//! `jarvis doctor` — Diagnose system health.

use std::path::Path;

use jarvis_config::AppConfig;
use jarvis_skills::{SkillCatalog, SkillSettings};

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Jarvis Doctor — System Diagnostics");
    println!("==================================\n");

    let mut issues = 0;
    let mut blocking = 0;

    let path = AppConfig::resolve_path(config_path);
    if path.exists() {
        println!("  ✅ Config file found: {}", path.display());
    } else {
        println!("  ⚠️  No config file at {} — using defaults (run `jarvis onboard`)", path.display());
        issues += 1;
    }

    let config = match AppConfig::load(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  1 blocking issue found.");
            return Err(e.into());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key — set OPENAI_API_KEY or add api_key to the config file");
        issues += 1;
    }

    let model = jarvis_providers::select_from_config(&config);
    if model.is_fallback() && config.model.provider != "local-echo" {
        println!(
            "  ⚠️  Model backend '{}' unavailable — replies come from the local fallback",
            config.model.provider
        );
        issues += 1;
    } else {
        println!(
            "  ✅ Model backend: {} ({})",
            model.provider_name(),
            model.params().model
        );
        if !model.is_fallback() {
            match model.provider().health_check().await {
                Ok(true) => println!("  ✅ Model backend reachable"),
                Ok(false) => {
                    println!("  ⚠️  Model backend answered but rejected the health check");
                    issues += 1;
                }
                Err(e) => {
                    println!("  ⚠️  Model backend unreachable: {e}");
                    issues += 1;
                }
            }
        }
    }

    match SkillCatalog::builtin().load(&config.skills, &SkillSettings::from_config(&config)) {
        Ok(registry) => println!("  ✅ Skills loaded: {}", registry.names().join(", ")),
        Err(e) => {
            println!("  ❌ Skills failed to load: {e}");
            issues += 1;
            blocking += 1;
        }
    }

    let tasks_dir = config.memory.persistent_tasks_path.parent();
    if tasks_dir.is_none_or(|d| d.exists()) {
        println!("  ✅ Data directory exists");
    } else {
        println!("  ⚠️  No data directory — run `jarvis onboard`");
        issues += 1;
    }

    if config.audio.enable_voice {
        println!("  ⚠️  Voice mode enabled but no speech backend is available");
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    if blocking > 0 {
        return Err(format!("{blocking} blocking issue(s) found").into());
    }
    Ok(())
}
