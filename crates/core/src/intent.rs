//! Intent — the structured classification of an utterance.
//!
//! Produced fresh for every utterance and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Dotted category, e.g. `tasks.add`
    pub name: String,

    /// Provenance marker in `[0, 1]`, not a computed probability
    pub confidence: f32,

    /// Named entities extracted from the utterance
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub entities: HashMap<String, String>,
}

impl Intent {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence: confidence.clamp(0.0, 1.0),
            entities: HashMap::new(),
        }
    }

    pub fn with_entity(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entities.insert(key.into(), value.into());
        self
    }

    /// Look up an entity by name.
    pub fn entity(&self, key: &str) -> Option<&str> {
        self.entities.get(key).map(String::as_str)
    }

    /// The category part of the name (`tasks` for `tasks.add`).
    pub fn category(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_is_prefix_before_dot() {
        let intent = Intent::new("tasks.add", 0.8);
        assert_eq!(intent.category(), "tasks");
        assert!(intent.is("tasks.add"));
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(Intent::new("x", 1.7).confidence, 1.0);
        assert_eq!(Intent::new("x", -0.2).confidence, 0.0);
    }

    #[test]
    fn entities_are_looked_up_by_name() {
        let intent = Intent::new("weather.get", 0.8).with_entity("location", "Paris");
        assert_eq!(intent.entity("location"), Some("Paris"));
        assert_eq!(intent.entity("missing"), None);
    }
}
