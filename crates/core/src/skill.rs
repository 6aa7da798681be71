//! Skill trait — the abstraction over assistant capabilities.
//!
//! Skills answer certain utterances without consulting a language model:
//! managing tasks, running allowlisted commands, looking up the weather, etc.

use async_trait::async_trait;
use tracing::debug;
use crate::context::ConversationContext;
use crate::intent::Intent;
use crate::provider::ToolDefinition;

/// The core Skill trait.
///
/// `can_handle` is a pure predicate. `handle` may touch the outside world
/// (files, subprocesses, network) but always produces a reply: failures are
/// reported to the user as text, never returned to the caller.
#[async_trait]
pub trait Skill: Send + Sync {
    /// The unique name of this skill (e.g., "tasks").
    fn name(&self) -> &str;

    /// A short description of what this skill does.
    fn description(&self) -> &str;

    /// Whether this skill accepts the classified utterance.
    fn can_handle(&self, intent: &Intent, text: &str) -> bool;

    /// Produce a reply for an utterance this skill accepted.
    async fn handle(&self, intent: &Intent, text: &str, context: &ConversationContext) -> String;

    /// Optional structured description for model function calling.
    fn tool_spec(&self) -> Option<ToolDefinition> {
        None
    }
}

/// The reply produced by the skill that claimed an utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillReply {
    pub skill: String,
    pub content: String,
}

/// An ordered collection of skills.
///
/// Registration order is dispatch precedence: the first skill whose
/// `can_handle` accepts wins and later skills are never consulted.
pub struct SkillRegistry {
    skills: Vec<Box<dyn Skill>>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self { skills: Vec::new() }
    }

    /// Append a skill at the lowest precedence.
    pub fn register(&mut self, skill: Box<dyn Skill>) {
        self.skills.push(skill);
    }

    /// Get a skill by name.
    pub fn get(&self, name: &str) -> Option<&dyn Skill> {
        self.skills
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    /// Skill names in precedence order.
    pub fn names(&self) -> Vec<&str> {
        self.skills.iter().map(|s| s.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Skill> {
        self.skills.iter().map(|s| s.as_ref())
    }

    /// Tool definitions of every skill that exposes one.
    pub fn tool_specs(&self) -> Vec<ToolDefinition> {
        self.skills.iter().filter_map(|s| s.tool_spec()).collect()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Route an utterance to the first accepting skill.
    pub async fn dispatch(
        &self,
        intent: &Intent,
        text: &str,
        context: &ConversationContext,
    ) -> Option<SkillReply> {
        let skill = self.skills.iter().find(|s| s.can_handle(intent, text))?;
        debug!(skill = %skill.name(), intent = %intent.name, "Skill accepted utterance");
        let content = skill.handle(intent, text, context).await;
        Some(SkillReply {
            skill: skill.name().to_string(),
            content,
        })
    }
}

impl Default for SkillRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A skill that accepts one intent name and counts its invocations.
    struct CountingSkill {
        name: &'static str,
        accepts: &'static str,
        calls: Arc<AtomicUsize>,
    }

    impl CountingSkill {
        fn new(name: &'static str, accepts: &'static str) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    name,
                    accepts,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl Skill for CountingSkill {
        fn name(&self) -> &str { self.name }
        fn description(&self) -> &str { "Counts calls" }
        fn can_handle(&self, intent: &Intent, _text: &str) -> bool {
            intent.name == self.accepts
        }
        async fn handle(&self, _intent: &Intent, _text: &str, _context: &ConversationContext) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            format!("handled by {}", self.name)
        }
    }

    #[tokio::test]
    async fn first_acceptor_wins() {
        let (a, a_calls) = CountingSkill::new("a", "demo.run");
        let (b, b_calls) = CountingSkill::new("b", "demo.run");
        let mut registry = SkillRegistry::new();
        registry.register(Box::new(a));
        registry.register(Box::new(b));

        let ctx = ConversationContext::new("persona", 4);
        let reply = registry
            .dispatch(&Intent::new("demo.run", 0.8), "run demo", &ctx)
            .await
            .unwrap();

        assert_eq!(reply.skill, "a");
        assert_eq!(reply.content, "handled by a");
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn later_skill_handles_when_earlier_declines() {
        let (a, a_calls) = CountingSkill::new("a", "other.intent");
        let (b, _) = CountingSkill::new("b", "demo.run");
        let mut registry = SkillRegistry::new();
        registry.register(Box::new(a));
        registry.register(Box::new(b));

        let ctx = ConversationContext::new("persona", 4);
        let reply = registry
            .dispatch(&Intent::new("demo.run", 0.8), "run demo", &ctx)
            .await
            .unwrap();
        assert_eq!(reply.skill, "b");
        assert_eq!(a_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_acceptor_returns_none() {
        let (a, _) = CountingSkill::new("a", "demo.run");
        let mut registry = SkillRegistry::new();
        registry.register(Box::new(a));

        let ctx = ConversationContext::new("persona", 4);
        let reply = registry
            .dispatch(&Intent::new("social.chat", 0.5), "hello", &ctx)
            .await;
        assert!(reply.is_none());
    }

    #[test]
    fn names_preserve_registration_order() {
        let mut registry = SkillRegistry::new();
        registry.register(Box::new(CountingSkill::new("zeta", "z").0));
        registry.register(Box::new(CountingSkill::new("alpha", "a").0));
        assert_eq!(registry.names(), vec!["zeta", "alpha"]);
        assert!(registry.get("alpha").is_some());
        assert!(registry.get("beta").is_none());
        assert!(registry.tool_specs().is_empty());
    }
}
