//! The assistant orchestrator.
//!
//! Every utterance goes through the same steps:
//!
//! 1. **Classify** the raw text into an optional intent
//! 2. **Route** a classified utterance to the first skill that accepts it
//! 3. **Fall back** to the model backend with the full conversation when no
//!    skill answered
//! 4. **Record** the user turn and the reply in the conversation context
//!
//! Utterances are handled strictly one at a time through `&mut self`.

use jarvis_config::AppConfig;
use jarvis_core::context::ConversationContext;
use jarvis_core::intent::Intent;
use jarvis_core::skill::SkillRegistry;
use jarvis_providers::ModelHandle;
use jarvis_skills::{SkillCatalog, SkillSettings};
use tracing::{debug, info};
use uuid::Uuid;

use crate::AgentError;
use crate::nlu::IntentClassifier;

/// Observable lifecycle of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No utterance handled since startup or the last reset.
    Idle,
    /// The context holds conversation turns.
    Active,
}

pub struct Assistant {
    session_id: Uuid,
    state: SessionState,
    context: ConversationContext,
    classifier: IntentClassifier,
    skills: SkillRegistry,
    model: ModelHandle,
}

impl Assistant {
    /// Assemble an assistant from already-built parts.
    pub fn new(
        context: ConversationContext,
        classifier: IntentClassifier,
        skills: SkillRegistry,
        model: ModelHandle,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: SessionState::Idle,
            context,
            classifier,
            skills,
            model,
        }
    }

    /// Build the assistant described by `config`.
    ///
    /// Skill loading failures are fatal. Model backend problems are not:
    /// the session degrades to the local echo backend.
    pub fn from_config(config: &AppConfig) -> Result<Self, AgentError> {
        config.ensure_data_dirs()?;

        let context = ConversationContext::new(
            config.persona.clone(),
            config.memory.conversation_history,
        );
        let skills =
            SkillCatalog::builtin().load(&config.skills, &SkillSettings::from_config(config))?;
        let model = jarvis_providers::select_from_config(config);

        let assistant = Self::new(context, IntentClassifier::builtin(), skills, model);
        info!(
            session = %assistant.session_id,
            skills = ?assistant.skill_names(),
            backend = %assistant.model.provider_name(),
            fallback = assistant.model.is_fallback(),
            "Assistant ready"
        );
        Ok(assistant)
    }

    /// Handle one utterance and return the reply.
    pub async fn handle_text(&mut self, text: &str) -> String {
        let intent = self.classifier.parse(text);
        debug!(
            intent = intent.as_ref().map(|i| i.name.as_str()).unwrap_or("none"),
            "Utterance classified"
        );

        let reply = match self.route_to_skill(intent.as_ref(), text).await {
            Some(reply) => {
                self.context.add_user_message(text);
                self.context.add_assistant_message(reply.clone());
                reply
            }
            None => {
                self.context.add_user_message(text);
                let reply = self.model.generate(&self.context.messages()).await;
                self.context.add_assistant_message(reply.clone());
                reply
            }
        };

        self.state = SessionState::Active;
        reply
    }

    async fn route_to_skill(&self, intent: Option<&Intent>, text: &str) -> Option<String> {
        let intent = intent?;
        let reply = self.skills.dispatch(intent, text, &self.context).await?;
        debug!(skill = %reply.skill, "Skill answered");
        Some(reply.content)
    }

    /// Forget the conversation. Skills and the model backend are kept.
    pub fn reset(&mut self) {
        self.context.clear();
        self.state = SessionState::Idle;
        debug!(session = %self.session_id, "Conversation reset");
    }

    /// Classify without handling.
    pub fn classify(&self, text: &str) -> Option<Intent> {
        self.classifier.parse(text)
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn skills(&self) -> &SkillRegistry {
        &self.skills
    }

    pub fn skill_names(&self) -> Vec<&str> {
        self.skills.names()
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use jarvis_core::error::ProviderError;
    use jarvis_core::message::{Message, Role};
    use jarvis_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use jarvis_core::skill::Skill;
    use jarvis_providers::ModelParams;
    use std::sync::{Arc, Mutex};

    /// Records every request and replies with a fixed string.
    struct RecordingProvider {
        requests: Mutex<Vec<Vec<Message>>>,
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> std::result::Result<ProviderResponse, ProviderError> {
            self.requests.lock().unwrap().push(request.messages);
            Ok(ProviderResponse {
                message: Message::assistant("Model reply."),
                usage: None,
                model: request.model,
            })
        }
    }

    struct EchoSkill;

    #[async_trait]
    impl Skill for EchoSkill {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes run commands"
        }
        fn can_handle(&self, intent: &Intent, _text: &str) -> bool {
            intent.is("system.run")
        }
        async fn handle(&self, intent: &Intent, _text: &str, _ctx: &ConversationContext) -> String {
            format!("echo: {}", intent.entity("command").unwrap_or(""))
        }
    }

    /// Claims everything, even unclassified text, if it were ever asked.
    struct GreedySkill;

    #[async_trait]
    impl Skill for GreedySkill {
        fn name(&self) -> &str {
            "greedy"
        }
        fn description(&self) -> &str {
            "Accepts anything"
        }
        fn can_handle(&self, _intent: &Intent, _text: &str) -> bool {
            true
        }
        async fn handle(&self, _intent: &Intent, _text: &str, _ctx: &ConversationContext) -> String {
            "greedy".into()
        }
    }

    fn params() -> ModelParams {
        ModelParams {
            model: "test-model".into(),
            temperature: 0.6,
            max_output_tokens: 64,
        }
    }

    fn assistant_with(skills: SkillRegistry, max_turns: usize) -> (Assistant, Arc<RecordingProvider>) {
        let provider = Arc::new(RecordingProvider {
            requests: Mutex::new(Vec::new()),
        });
        let model = ModelHandle::new(provider.clone(), params(), "You are Jarvis.");
        let assistant = Assistant::new(
            ConversationContext::new("You are Jarvis.", max_turns),
            IntentClassifier::builtin(),
            skills,
            model,
        );
        (assistant, provider)
    }

    #[tokio::test]
    async fn skill_hit_records_raw_text_and_reply() {
        let mut skills = SkillRegistry::new();
        skills.register(Box::new(EchoSkill));
        let (mut assistant, provider) = assistant_with(skills, 8);

        assert_eq!(assistant.state(), SessionState::Idle);
        let reply = assistant.handle_text("  run diagnostics ").await;
        assert_eq!(reply, "echo: diagnostics");
        assert_eq!(assistant.state(), SessionState::Active);

        let history: Vec<&Message> = assistant.context().history().collect();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content(), "  run diagnostics ");
        assert_eq!(history[1].content(), "echo: diagnostics");
        assert!(provider.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_skill_falls_through_to_model_with_full_context() {
        let (mut assistant, provider) = assistant_with(SkillRegistry::new(), 8);

        assert_eq!(assistant.handle_text("hello").await, "Model reply.");
        assert_eq!(assistant.handle_text("tell me a joke").await, "Model reply.");

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let last = &requests[1];
        assert_eq!(last.len(), 4);
        assert_eq!(last[0].role(), Role::System);
        assert_eq!(last[0].content(), "You are Jarvis.");
        assert_eq!(last[3].content(), "tell me a joke");
        assert_eq!(assistant.context().len(), 4);
    }

    #[tokio::test]
    async fn unclassified_text_never_reaches_skills() {
        let mut skills = SkillRegistry::new();
        skills.register(Box::new(GreedySkill));
        let (mut assistant, provider) = assistant_with(skills, 8);

        assert_eq!(assistant.handle_text("the quick brown fox").await, "Model reply.");
        assert_eq!(assistant.handle_text("hello").await, "greedy");
        assert_eq!(provider.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn history_stays_bounded() {
        let (mut assistant, _) = assistant_with(SkillRegistry::new(), 3);
        for i in 0..5 {
            assistant.handle_text(&format!("message {i}")).await;
            assert!(assistant.context().len() <= 3);
        }
        let last = assistant.context().last_message().unwrap();
        assert_eq!(last.role(), Role::Assistant);
    }

    #[tokio::test]
    async fn reset_clears_only_the_conversation() {
        let mut skills = SkillRegistry::new();
        skills.register(Box::new(EchoSkill));
        let (mut assistant, _) = assistant_with(skills, 8);
        let session = assistant.session_id();

        assistant.handle_text("hello").await;
        assistant.reset();

        assert_eq!(assistant.state(), SessionState::Idle);
        let messages = assistant.context().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role(), Role::System);
        assert_eq!(assistant.skill_names(), vec!["echo"]);
        assert_eq!(assistant.session_id(), session);
        assert_eq!(assistant.handle_text("run again").await, "echo: again");
    }

    #[test]
    fn from_config_with_unknown_skill_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.memory.persistent_tasks_path = dir.path().join("tasks.json");
        config.memory.knowledge_base = Some(dir.path().join("knowledge.json"));
        config.skills = vec!["tasks".into(), "jetpack".into()];

        let err = Assistant::from_config(&config).err().unwrap();
        assert!(matches!(err, AgentError::Skill(_)));
    }

    #[test]
    fn from_config_without_credential_uses_fallback() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.api_key = None;
        config.memory.persistent_tasks_path = dir.path().join("data").join("tasks.json");
        config.memory.knowledge_base = Some(dir.path().join("knowledge.json"));

        let assistant = Assistant::from_config(&config).unwrap();
        assert!(assistant.model().is_fallback());
        assert_eq!(
            assistant.skill_names(),
            vec!["system", "tasks", "knowledge", "weather"]
        );
        assert!(dir.path().join("data").is_dir());
    }
}
