//! Local echo provider: the deterministic fallback backend.
//!
//! Needs no network and no credentials, so it is always constructible. It
//! restates the persona and the last user message, letting the assistant
//! stay responsive while no real model is configured.

use async_trait::async_trait;
use jarvis_core::error::ProviderError;
use jarvis_core::message::{Message, Role};
use jarvis_core::provider::{ProviderRequest, ProviderResponse};

pub const LOCAL_ECHO: &str = "local-echo";

/// A provider that answers without a language model.
pub struct LocalEchoProvider {
    persona: String,
}

impl LocalEchoProvider {
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
        }
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    /// Build the fallback reply for a conversation.
    pub fn reply_for(&self, messages: &[Message]) -> String {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role() == Role::User)
            .map(|m| m.content())
            .unwrap_or("");

        format!(
            "{}\n\nI am operating in fallback mode because no language model is configured. \
             You asked: '{}'. I recommend configuring an OpenAI API key or another backend \
             for richer responses.",
            self.persona, last_user
        )
    }
}

#[async_trait]
impl jarvis_core::Provider for LocalEchoProvider {
    fn name(&self) -> &str {
        LOCAL_ECHO
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        Ok(ProviderResponse {
            message: Message::assistant(self.reply_for(&request.messages)),
            usage: None,
            model: LOCAL_ECHO.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jarvis_core::Provider;

    fn request(messages: Vec<Message>) -> ProviderRequest {
        ProviderRequest {
            model: "gpt-4o-mini".into(),
            messages,
            temperature: 0.6,
            max_tokens: Some(512),
        }
    }

    #[tokio::test]
    async fn echoes_persona_and_last_user_message() {
        let provider = LocalEchoProvider::new("You are Jarvis.");
        let response = provider
            .complete(request(vec![
                Message::system("You are Jarvis."),
                Message::user("first"),
                Message::assistant("ok"),
                Message::user("hello"),
            ]))
            .await
            .unwrap();

        let text = response.message.content();
        assert!(text.starts_with("You are Jarvis."));
        assert!(text.contains("You asked: 'hello'"));
        assert!(!text.contains("'first'"));
        assert_eq!(response.model, "local-echo");
    }

    #[test]
    fn no_user_message_gives_empty_quote() {
        let provider = LocalEchoProvider::new("Persona");
        let text = provider.reply_for(&[Message::system("Persona")]);
        assert!(text.contains("You asked: ''"));
        assert!(text.contains("fallback mode"));
    }
}
