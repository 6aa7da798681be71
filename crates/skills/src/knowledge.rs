//! Knowledge skill: answers from a small local JSON knowledge base.
//!
//! The file is a flat JSON object mapping topics to answers. Keys are
//! matched case-insensitively: exact topic first, then the first topic in
//! file order containing the query.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use jarvis_core::context::ConversationContext;
use jarvis_core::error::SkillError;
use jarvis_core::intent::Intent;
use jarvis_core::skill::Skill;
use tracing::{debug, warn};

const LOOKUP_INTENT: &str = "knowledge.lookup";

pub struct KnowledgeSkill {
    path: PathBuf,
    entries: Vec<(String, String)>,
}

impl KnowledgeSkill {
    /// Load the knowledge base at `path`. A missing file gives an empty base.
    pub fn open(path: &Path) -> Result<Self, SkillError> {
        let entries = Self::load_from_disk(path)?;
        debug!(path = %path.display(), count = entries.len(), "Knowledge base loaded");
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    fn load_from_disk(path: &Path) -> Result<Vec<(String, String)>, SkillError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(SkillError::InitFailed {
                    skill: "knowledge".into(),
                    reason: format!("cannot read {}: {e}", path.display()),
                });
            }
        };

        match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&content) {
            Ok(map) => {
                let mut entries: Vec<(String, String)> = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let key = key.to_lowercase();
                    let answer = match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    // Keys colliding after lowercasing keep the first position and the last answer.
                    match entries.iter_mut().find(|(k, _)| *k == key) {
                        Some(existing) => existing.1 = answer,
                        None => entries.push((key, answer)),
                    }
                }
                Ok(entries)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable knowledge base");
                Ok(Vec::new())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, query: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == query)
            .or_else(|| self.entries.iter().find(|(k, _)| k.contains(query)))
            .map(|(_, v)| v.as_str())
    }
}

#[async_trait]
impl Skill for KnowledgeSkill {
    fn name(&self) -> &str {
        "knowledge"
    }

    fn description(&self) -> &str {
        "Answer questions using a lightweight local knowledge base."
    }

    fn can_handle(&self, intent: &Intent, _text: &str) -> bool {
        intent.is(LOOKUP_INTENT)
    }

    async fn handle(&self, intent: &Intent, text: &str, _context: &ConversationContext) -> String {
        let query = intent
            .entity("query")
            .unwrap_or(text)
            .trim()
            .trim_end_matches(['?', '!', '.'])
            .trim()
            .to_lowercase();

        if query.is_empty() {
            return "Please tell me what you would like to know.".into();
        }

        match self.lookup(&query) {
            Some(answer) => answer.to_string(),
            None => format!(
                "I don't have that in my knowledge base yet. You can teach me by editing the JSON file at {}",
                self.path.display()
            ),
        }
    }
}
