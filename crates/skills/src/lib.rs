//! Built-in skills for Jarvis.
//!
//! Skills give the assistant abilities that do not need a language model:
//! run a few safe local commands, keep a task list, answer from a local
//! knowledge file, and report the weather.
//!
//! Skills are created from configuration identifiers through a
//! [`SkillCatalog`], an explicit table from tag to factory.

pub mod knowledge;
pub mod system;
pub mod tasks;
pub mod weather;

use std::path::PathBuf;

use jarvis_config::AppConfig;
use jarvis_core::error::SkillError;
use jarvis_core::skill::{Skill, SkillRegistry};
use tracing::{debug, info};

pub use knowledge::KnowledgeSkill;
pub use system::{AllowedCommand, SystemSkill};
pub use tasks::TaskSkill;
pub use weather::WeatherSkill;

/// Optional namespace accepted in front of built-in tags.
const BUILTIN_PREFIX: &str = "builtin:";

/// Everything a factory may need to construct its skill.
#[derive(Debug, Clone)]
pub struct SkillSettings {
    /// JSON array file backing the task list.
    pub tasks_path: PathBuf,
    /// JSON object file backing knowledge lookups.
    pub knowledge_path: PathBuf,
}

impl SkillSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            tasks_path: config.memory.persistent_tasks_path.clone(),
            knowledge_path: config.memory.knowledge_path(),
        }
    }
}

/// Constructs one skill instance.
pub type SkillFactory = fn(&SkillSettings) -> Result<Box<dyn Skill>, SkillError>;

/// Maps skill tags to the factories that build them.
pub struct SkillCatalog {
    entries: Vec<(&'static str, SkillFactory)>,
}

impl SkillCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// A catalog with every built-in skill.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register("system", |_| Ok(Box::new(SystemSkill::new())));
        catalog.register("tasks", |s| Ok(Box::new(TaskSkill::open(&s.tasks_path)?)));
        catalog.register("knowledge", |s| {
            Ok(Box::new(KnowledgeSkill::open(&s.knowledge_path)?))
        });
        catalog.register("weather", |_| Ok(Box::new(WeatherSkill::new()?)));
        catalog
    }

    /// Add or replace the factory for a tag.
    pub fn register(&mut self, tag: &'static str, factory: SkillFactory) {
        match self.entries.iter_mut().find(|(t, _)| *t == tag) {
            Some(entry) => entry.1 = factory,
            None => self.entries.push((tag, factory)),
        }
    }

    /// Registered tags in registration order.
    pub fn tags(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(t, _)| *t).collect()
    }

    /// Resolve an identifier (`tag` or `builtin:tag`) to its factory.
    fn resolve(&self, identifier: &str) -> Result<SkillFactory, SkillError> {
        if identifier.trim().is_empty() || identifier.chars().any(char::is_whitespace) {
            return Err(SkillError::MalformedIdentifier(identifier.to_string()));
        }

        let tag = identifier.strip_prefix(BUILTIN_PREFIX).unwrap_or(identifier);
        if tag.is_empty() {
            return Err(SkillError::MalformedIdentifier(identifier.to_string()));
        }

        self.entries
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, f)| *f)
            .ok_or_else(|| SkillError::UnknownSkill(identifier.to_string()))
    }

    /// Build a registry from ordered identifiers.
    ///
    /// Order is preserved as dispatch precedence. The first identifier
    /// that cannot be resolved or constructed aborts the whole load.
    pub fn load<S: AsRef<str>>(
        &self,
        identifiers: &[S],
        settings: &SkillSettings,
    ) -> Result<SkillRegistry, SkillError> {
        let mut registry = SkillRegistry::new();
        for identifier in identifiers {
            let identifier = identifier.as_ref();
            let factory = self.resolve(identifier)?;
            let skill = factory(settings)?;
            debug!(identifier, skill = %skill.name(), "Skill loaded");
            registry.register(skill);
        }
        info!(skills = ?registry.names(), "Skill registry ready");
        Ok(registry)
    }
}

impl Default for SkillCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(dir: &TempDir) -> SkillSettings {
        SkillSettings {
            tasks_path: dir.path().join("tasks.json"),
            knowledge_path: dir.path().join("knowledge.json"),
        }
    }

    #[test]
    fn builtin_tags() {
        let catalog = SkillCatalog::builtin();
        assert_eq!(catalog.tags(), vec!["system", "tasks", "knowledge", "weather"]);
    }

    #[test]
    fn load_preserves_identifier_order() {
        let dir = TempDir::new().unwrap();
        let registry = SkillCatalog::builtin()
            .load(&["weather", "builtin:tasks", "system"], &settings(&dir))
            .unwrap();
        assert_eq!(registry.names(), vec!["weather", "tasks", "system"]);
    }

    #[test]
    fn unknown_tag_aborts_load() {
        let dir = TempDir::new().unwrap();
        let err = SkillCatalog::builtin()
            .load(&["system", "teleport"], &settings(&dir))
            .err()
            .unwrap();
        assert!(matches!(err, SkillError::UnknownSkill(ref id) if id == "teleport"));
    }

    #[test]
    fn malformed_identifiers_rejected() {
        let dir = TempDir::new().unwrap();
        let catalog = SkillCatalog::builtin();
        for bad in ["", "   ", "sys tem", "builtin:"] {
            let err = catalog.load(&[bad], &settings(&dir)).err().unwrap();
            assert!(
                matches!(err, SkillError::MalformedIdentifier(_)),
                "{bad:?} should be malformed"
            );
        }
    }

    #[test]
    fn factory_failure_is_init_failed() {
        let dir = TempDir::new().unwrap();
        let mut catalog = SkillCatalog::new();
        catalog.register("broken", |_| {
            Err(SkillError::InitFailed {
                skill: "broken".into(),
                reason: "no hardware".into(),
            })
        });
        let err = catalog.load(&["broken"], &settings(&dir)).err().unwrap();
        assert!(matches!(err, SkillError::InitFailed { .. }));
    }

    #[test]
    fn empty_identifier_list_gives_empty_registry() {
        let dir = TempDir::new().unwrap();
        let registry = SkillCatalog::builtin()
            .load::<&str>(&[], &settings(&dir))
            .unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn settings_follow_config() {
        let config = AppConfig::default();
        let settings = SkillSettings::from_config(&config);
        assert_eq!(settings.tasks_path, config.memory.persistent_tasks_path);
        assert!(settings.knowledge_path.ends_with("knowledge.json"));
    }
}
