//! Model backend selection.
//!
//! The backend is chosen once per session. Anything that prevents the
//! preferred backend from being built (unknown tag, missing credential,
//! broken HTTP client) degrades to [`LocalEchoProvider`] instead of
//! failing startup.

use std::sync::Arc;

use jarvis_config::AppConfig;
use jarvis_core::error::ProviderError;
use jarvis_core::message::Message;
use jarvis_core::provider::{Provider, ProviderRequest};
use tracing::{debug, info, warn};

use crate::local::{LOCAL_ECHO, LocalEchoProvider};
use crate::openai_compat::OpenAiCompatProvider;

/// Providers served by a local server that needs no credential.
const KEYLESS_PROVIDERS: &[&str] = &["ollama", "vllm", "llamacpp", "llama.cpp"];

/// Providers spoken to over the OpenAI-compatible wire format.
const HOSTED_PROVIDERS: &[&str] = &[
    "openai",
    "openrouter",
    "groq",
    "deepseek",
    "together",
    "fireworks",
];

/// Generation parameters sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Everything needed to pick a backend.
#[derive(Clone)]
pub struct ModelSelection {
    /// Backend tag: `openai`, `ollama`, `local-echo`, `custom:<url>`, ...
    pub provider: String,
    pub params: ModelParams,
    pub api_key: Option<String>,
    /// Overrides the well-known base URL of the tag.
    pub api_url: Option<String>,
}

impl std::fmt::Debug for ModelSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSelection")
            .field("provider", &self.provider)
            .field("params", &self.params)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl ModelSelection {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            provider: config.model.provider.trim().to_lowercase(),
            params: ModelParams {
                model: config.model.model.clone(),
                temperature: config.model.temperature,
                max_output_tokens: config.model.max_output_tokens,
            },
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            api_url: config.model.api_url.clone(),
        }
    }
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> Option<&'static str> {
    match provider_name {
        "openrouter" => Some("https://openrouter.ai/api/v1"),
        "openai" => Some("https://api.openai.com/v1"),
        "ollama" => Some("http://localhost:11434/v1"),
        "deepseek" => Some("https://api.deepseek.com/v1"),
        "groq" => Some("https://api.groq.com/openai/v1"),
        "together" => Some("https://api.together.xyz/v1"),
        "fireworks" => Some("https://api.fireworks.ai/inference/v1"),
        "vllm" => Some("http://localhost:8000/v1"),
        "llamacpp" | "llama.cpp" => Some("http://localhost:8080/v1"),
        _ => None,
    }
}

/// Build the preferred backend, reporting why it cannot be used.
pub fn build_primary(selection: &ModelSelection) -> Result<Arc<dyn Provider>, ProviderError> {
    let tag = selection.provider.as_str();

    if let Some(url) = tag.strip_prefix("custom:") {
        if url.trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "custom provider needs a URL, e.g. custom:http://localhost:9000/v1".into(),
            ));
        }
        let key = selection.api_key.clone().unwrap_or_default();
        return Ok(Arc::new(OpenAiCompatProvider::try_new("custom", url.trim(), key)?));
    }

    let keyless = KEYLESS_PROVIDERS.contains(&tag);
    if !keyless && !HOSTED_PROVIDERS.contains(&tag) {
        return Err(ProviderError::UnknownProvider(tag.to_string()));
    }

    let key = match (&selection.api_key, keyless) {
        (Some(key), _) => key.clone(),
        (None, true) => tag.to_string(),
        (None, false) => return Err(ProviderError::MissingCredential(tag.to_string())),
    };

    let base_url = match selection.api_url.as_deref() {
        Some(url) => url.to_string(),
        None => default_base_url(tag)
            .ok_or_else(|| ProviderError::NotConfigured(format!("no base URL for '{tag}'")))?
            .to_string(),
    };

    Ok(Arc::new(OpenAiCompatProvider::try_new(tag, base_url, key)?))
}

/// Select the session's backend. Never fails.
pub fn select(selection: &ModelSelection, persona: &str) -> ModelHandle {
    if selection.provider == LOCAL_ECHO {
        info!("Using local echo backend");
        return ModelHandle::fallback(persona, selection.params.clone());
    }

    match build_primary(selection) {
        Ok(provider) => {
            info!(provider = %provider.name(), model = %selection.params.model, "Model backend selected");
            ModelHandle::new(provider, selection.params.clone(), persona)
        }
        Err(e) => {
            warn!(provider = %selection.provider, error = %e, "Falling back to local echo backend");
            ModelHandle::fallback(persona, selection.params.clone())
        }
    }
}

/// Shorthand for `select(&ModelSelection::from_config(config), &config.persona)`.
pub fn select_from_config(config: &AppConfig) -> ModelHandle {
    select(&ModelSelection::from_config(config), &config.persona)
}

/// The backend chosen for a session, plus the parameters it is called with.
#[derive(Clone)]
pub struct ModelHandle {
    provider: Arc<dyn Provider>,
    params: ModelParams,
    persona: String,
    fallback: bool,
}

impl ModelHandle {
    pub fn new(provider: Arc<dyn Provider>, params: ModelParams, persona: impl Into<String>) -> Self {
        Self {
            provider,
            params,
            persona: persona.into(),
            fallback: false,
        }
    }

    pub fn fallback(persona: impl Into<String>, params: ModelParams) -> Self {
        let persona = persona.into();
        Self {
            provider: Arc::new(LocalEchoProvider::new(persona.clone())),
            params,
            persona,
            fallback: true,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Produce a reply for the ordered conversation. The result is never
    /// empty: provider errors become an explanatory reply.
    pub async fn generate(&self, messages: &[Message]) -> String {
        let request = ProviderRequest {
            model: self.params.model.clone(),
            messages: messages.to_vec(),
            temperature: self.params.temperature,
            max_tokens: Some(self.params.max_output_tokens),
        };

        match self.provider.complete(request).await {
            Ok(response) => {
                if let Some(usage) = &response.usage {
                    debug!(
                        model = %response.model,
                        total_tokens = usage.total_tokens,
                        "Completion received"
                    );
                }
                let text = response.message.content().trim();
                if text.is_empty() {
                    warn!(provider = %self.provider.name(), "Model returned an empty completion");
                    "I don't have an answer for that right now.".to_string()
                } else {
                    text.to_string()
                }
            }
            Err(e) => {
                warn!(provider = %self.provider.name(), error = %e, "Model request failed");
                format!("I'm having trouble reaching the language model right now: {e}")
            }
        }
    }
}
