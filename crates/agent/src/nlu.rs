//! Rule-based intent classification.
//!
//! Rules are an ordered table of `(intent name, pattern)` pairs evaluated
//! case-insensitively against the trimmed utterance. The first rule that
//! matches anywhere in the text wins, and its named capture groups become
//! the intent's entities. When no rule matches, a small greeting catch-all
//! produces a low-confidence `social.chat` intent.

use jarvis_core::intent::Intent;
use regex_lite::Regex;
use tracing::{debug, warn};

use crate::AgentError;

/// Confidence of every rule-based match.
pub const RULE_CONFIDENCE: f32 = 0.8;

/// Confidence of the greeting catch-all.
pub const GREETING_CONFIDENCE: f32 = 0.5;

pub const GREETING_INTENT: &str = "social.chat";

const GREETING_PATTERN: &str = r"(?i)\b(hi|hello|hey|thanks)\b";

/// One classification rule.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentRule {
    pub intent: String,
    pub pattern: String,
}

impl IntentRule {
    pub fn new(intent: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            pattern: pattern.into(),
        }
    }
}

/// The built-in rule table, in precedence order.
pub fn builtin_rules() -> Vec<IntentRule> {
    vec![
        IntentRule::new("system.run", r"^(run|execute|launch)\s+(?P<command>.+)"),
        IntentRule::new(
            "tasks.add",
            r"\b(remember|remind( me)?|add task|todo)\b(?P<task>.*)",
        ),
        IntentRule::new("tasks.list", r"\b(list|show)\s+(my\s+)?(tasks|todos)\b"),
        IntentRule::new(
            "knowledge.lookup",
            r"\b(what is|who is|define)\b(?P<query>.*)",
        ),
        IntentRule::new(
            "weather.get",
            r"\b(weather|forecast)\b(\s+(in|for|at)\b)?(?P<location>.*)",
        ),
    ]
}

struct CompiledRule {
    intent: String,
    regex: Regex,
}

pub struct IntentClassifier {
    rules: Vec<CompiledRule>,
    greeting: Option<Regex>,
}

fn compile(pattern: &str) -> Result<Regex, regex_lite::Error> {
    Regex::new(&format!("(?i){pattern}"))
}

impl IntentClassifier {
    /// Build a classifier from an ordered rule table.
    pub fn from_rules(rules: &[IntentRule]) -> Result<Self, AgentError> {
        let rules = rules
            .iter()
            .map(|rule| {
                compile(&rule.pattern)
                    .map(|regex| CompiledRule {
                        intent: rule.intent.clone(),
                        regex,
                    })
                    .map_err(|e| AgentError::InvalidRule {
                        intent: rule.intent.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rules,
            greeting: Regex::new(GREETING_PATTERN).ok(),
        })
    }

    /// The classifier with the built-in rule table.
    pub fn builtin() -> Self {
        let rules = builtin_rules()
            .into_iter()
            .filter_map(|rule| match compile(&rule.pattern) {
                Ok(regex) => Some(CompiledRule {
                    intent: rule.intent,
                    regex,
                }),
                Err(e) => {
                    warn!(intent = %rule.intent, error = %e, "Skipping invalid intent rule");
                    None
                }
            })
            .collect();

        Self {
            rules,
            greeting: Regex::new(GREETING_PATTERN).ok(),
        }
    }

    /// Rule intent names in precedence order.
    pub fn intents(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.intent.as_str()).collect()
    }

    /// Classify an utterance. Empty or unrecognised text yields `None`.
    pub fn parse(&self, text: &str) -> Option<Intent> {
        let normalized = text.trim();
        if normalized.is_empty() {
            return None;
        }

        for rule in &self.rules {
            let Some(caps) = rule.regex.captures(normalized) else {
                continue;
            };

            let mut intent = Intent::new(rule.intent.clone(), RULE_CONFIDENCE);
            for name in rule.regex.capture_names().flatten() {
                let value = caps.name(name).map(|m| m.as_str().trim()).unwrap_or("");
                if !value.is_empty() {
                    intent = intent.with_entity(name, value);
                }
            }

            debug!(intent = %intent.name, entities = ?intent.entities, "Rule matched");
            return Some(intent);
        }

        if self
            .greeting
            .as_ref()
            .is_some_and(|re| re.is_match(normalized))
        {
            return Some(Intent::new(GREETING_INTENT, GREETING_CONFIDENCE));
        }

        None
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<Intent> {
        IntentClassifier::default().parse(text)
    }

    #[test]
    fn builtin_rules_all_compile() {
        let classifier = IntentClassifier::default();
        assert_eq!(
            classifier.intents(),
            vec!["system.run", "tasks.add", "tasks.list", "knowledge.lookup", "weather.get"]
        );
        assert!(IntentClassifier::from_rules(&builtin_rules()).is_ok());
    }

    #[test]
    fn empty_and_whitespace_are_absent() {
        assert!(parse("").is_none());
        assert!(parse("   \t\n").is_none());
    }

    #[test]
    fn unmatched_text_is_absent() {
        assert!(parse("the quick brown fox").is_none());
        assert!(parse("this is ok").is_none());
        assert!(parse("chill out").is_none());
    }

    #[test]
    fn remind_me_extracts_task() {
        let intent = parse("remind me to call mom").unwrap();
        assert_eq!(intent.name, "tasks.add");
        assert_eq!(intent.entity("task"), Some("to call mom"));
        assert!((intent.confidence - RULE_CONFIDENCE).abs() < f32::EPSILON);
    }

    #[test]
    fn run_command() {
        let intent = parse("  Run list  ").unwrap();
        assert_eq!(intent.name, "system.run");
        assert_eq!(intent.entity("command"), Some("list"));
    }

    #[test]
    fn list_tasks_has_no_entities() {
        let intent = parse("list my tasks").unwrap();
        assert_eq!(intent.name, "tasks.list");
        assert!(intent.entities.is_empty());
    }

    #[test]
    fn knowledge_query() {
        let intent = parse("What is the arc reactor").unwrap();
        assert_eq!(intent.name, "knowledge.lookup");
        assert_eq!(intent.entity("query"), Some("the arc reactor"));
    }

    #[test]
    fn weather_location_drops_preposition() {
        let intent = parse("what's the weather in New York").unwrap();
        assert_eq!(intent.name, "weather.get");
        assert_eq!(intent.entity("location"), Some("New York"));

        let bare = parse("weather").unwrap();
        assert!(bare.entity("location").is_none());

        let info = parse("weather information").unwrap();
        assert_eq!(info.entity("location"), Some("information"));
    }

    #[test]
    fn earlier_rule_wins_on_overlap() {
        // Matches both tasks.add ("remember") and weather.get ("weather").
        let intent = parse("remember to check the weather").unwrap();
        assert_eq!(intent.name, "tasks.add");
        assert_eq!(intent.entity("task"), Some("to check the weather"));

        // Matches system.run and tasks.list.
        let intent = parse("run show my tasks").unwrap();
        assert_eq!(intent.name, "system.run");
    }

    #[test]
    fn greeting_catch_all() {
        for text in ["hello", "Hey there", "thanks!", "hi"] {
            let intent = parse(text).unwrap();
            assert_eq!(intent.name, GREETING_INTENT, "{text}");
            assert!((intent.confidence - GREETING_CONFIDENCE).abs() < f32::EPSILON);
            assert!(intent.entities.is_empty());
        }
    }

    #[test]
    fn greeting_needs_whole_word() {
        assert!(parse("this").is_none());
        assert!(parse("they went home").is_none());
    }

    #[test]
    fn custom_rule_table() {
        let classifier = IntentClassifier::from_rules(&[IntentRule::new(
            "music.play",
            r"\bplay\s+(?P<song>.+)",
        )])
        .unwrap();
        let intent = classifier.parse("Play Back in Black").unwrap();
        assert_eq!(intent.name, "music.play");
        assert_eq!(intent.entity("song"), Some("Back in Black"));
        assert!(classifier.parse("list my tasks").is_none());
    }

    #[test]
    fn invalid_rule_is_rejected() {
        let err = IntentClassifier::from_rules(&[IntentRule::new("broken", r"(unclosed")])
            .err()
            .unwrap();
        assert!(matches!(err, AgentError::InvalidRule { ref intent, .. } if intent == "broken"));
    }
}
