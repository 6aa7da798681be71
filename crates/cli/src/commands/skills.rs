//! `jarvis skills` — List loaded skills in precedence order.

use std::path::Path;

use jarvis_skills::{SkillCatalog, SkillSettings};

use super::load_config;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let catalog = SkillCatalog::builtin();
    let registry = catalog.load(&config.skills, &SkillSettings::from_config(&config))?;

    println!("Loaded skills (first match wins)");
    println!("================================");
    for (i, skill) in registry.iter().enumerate() {
        println!("  {}. {:<10} {}", i + 1, skill.name(), skill.description());
        if config.tools_enabled {
            if let Some(spec) = skill.tool_spec() {
                let params = spec.parameters["properties"]
                    .as_object()
                    .map(|p| p.keys().cloned().collect::<Vec<_>>().join(", "))
                    .unwrap_or_default();
                println!("     tool: {}({params})", spec.name);
            }
        }
    }
    if registry.is_empty() {
        println!("  (none — every request goes to the model backend)");
    }

    println!();
    println!("Available: {}", catalog.tags().join(", "));
    Ok(())
}
