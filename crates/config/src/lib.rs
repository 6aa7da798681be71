//! Configuration loading, validation, and management for Jarvis.
//!
//! Loads configuration from `~/.jarvis/config.toml` (or the path given by
//! `--config` / `JARVIS_CONFIG`) and layers `JARVIS_*` environment variables
//! on top. Validates all settings at startup.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "JARVIS_CONFIG";

/// Prefix for environment overrides. `JARVIS_MODEL__PROVIDER=openrouter`
/// overrides `model.provider`.
pub const ENV_PREFIX: &str = "JARVIS_";

/// Key paths whose environment overrides are always taken verbatim.
const STRING_KEYS: &[&str] = &[
    "name",
    "persona",
    "api_key",
    "model.provider",
    "model.model",
    "model.api_url",
    "audio.wake_word",
    "audio.input_device",
    "audio.output_device",
    "memory.knowledge_base",
    "memory.persistent_tasks_path",
];

pub const PERSONA_PROMPT: &str = "You are Jarvis, a composed, helpful AI butler inspired by Marvel's Iron \
     Man. You speak succinctly but with warmth, and always aim to provide \
     actionable assistance.";

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Display name of the assistant
    #[serde(default = "default_name")]
    pub name: String,

    /// Persona prepended to every model request
    #[serde(default = "default_persona")]
    pub persona: String,

    /// Credential for the primary model provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Ordered skill identifiers; order is dispatch precedence
    #[serde(default = "default_skills", deserialize_with = "string_or_list")]
    pub skills: Vec<String>,

    /// Whether skills advertise tool specs
    #[serde(default = "default_true")]
    pub tools_enabled: bool,

    /// Model backend selection
    #[serde(default)]
    pub model: ModelConfig,

    /// Voice mode settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// History bound and persistent data locations
    #[serde(default)]
    pub memory: MemoryConfig,
}

fn default_name() -> String {
    "Jarvis".into()
}
fn default_persona() -> String {
    PERSONA_PROMPT.into()
}
fn default_skills() -> Vec<String> {
    vec![
        "system".into(),
        "tasks".into(),
        "knowledge".into(),
        "weather".into(),
    ]
}
fn default_true() -> bool {
    true
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("name", &self.name)
            .field("persona", &self.persona)
            .field("api_key", &redact(&self.api_key))
            .field("skills", &self.skills)
            .field("tools_enabled", &self.tools_enabled)
            .field("model", &self.model)
            .field("audio", &self.audio)
            .field("memory", &self.memory)
            .finish()
    }
}

/// Accept either a TOML list or a comma-separated string (handy from env vars).
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::One(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        StringOrList::Many(list) => list,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider tag: "openai", "openrouter", "ollama", "local-echo", "custom:<url>", ...
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Override the provider's base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.6
}
fn default_max_output_tokens() -> u32 {
    512
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            api_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default)]
    pub enable_voice: bool,

    #[serde(default = "default_wake_word", skip_serializing_if = "Option::is_none")]
    pub wake_word: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_device: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_device: Option<String>,

    /// Capture sample rate in Hz
    #[serde(default = "default_rate")]
    pub rate: u32,

    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_wake_word() -> Option<String> {
    Some("jarvis".into())
}
fn default_rate() -> u32 {
    16_000
}
fn default_volume() -> f32 {
    1.0
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enable_voice: false,
            wake_word: default_wake_word(),
            input_device: None,
            output_device: None,
            rate: default_rate(),
            volume: default_volume(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum number of retained conversation turns
    #[serde(default = "default_conversation_history")]
    pub conversation_history: usize,

    /// JSON knowledge base file (defaults to `~/.jarvis/knowledge.json`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_base: Option<PathBuf>,

    /// JSON task list file
    #[serde(default = "default_tasks_path")]
    pub persistent_tasks_path: PathBuf,
}

fn default_conversation_history() -> usize {
    8
}
fn default_tasks_path() -> PathBuf {
    AppConfig::config_dir().join("tasks.json")
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            conversation_history: default_conversation_history(),
            knowledge_base: None,
            persistent_tasks_path: default_tasks_path(),
        }
    }
}

impl MemoryConfig {
    /// The knowledge base path, falling back to `~/.jarvis/knowledge.json`.
    pub fn knowledge_path(&self) -> PathBuf {
        self.knowledge_base
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("knowledge.json"))
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Path resolution: `path` argument, then `JARVIS_CONFIG`, then
    /// `~/.jarvis/config.toml`. A missing file yields defaults. `JARVIS_*`
    /// environment variables override file values, and the credential
    /// falls back to `OPENAI_API_KEY` / `OPENROUTER_API_KEY`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = Self::resolve_path(path);

        let mut table = read_table(&path)?;
        apply_env_overrides(&mut table, std::env::vars());

        let mut config = Self::from_table(table, &path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("OPENAI_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENROUTER_API_KEY").ok())
                .filter(|k| !k.trim().is_empty());
        }

        Ok(config)
    }

    /// The file `load` reads: `path`, else `JARVIS_CONFIG`, else the default.
    pub fn resolve_path(path: Option<&Path>) -> PathBuf {
        match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var(CONFIG_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| Self::default_path()),
        }
    }

    /// Load configuration from a specific file path, without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let table = read_table(path)?;
        Self::from_table(table, path)
    }

    fn from_table(table: toml::Table, path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::Value::Table(table)
                .try_into()
                .map_err(|e: toml::de::Error| ConfigError::ParseError {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;

        config.memory.persistent_tasks_path = expand_home(&config.memory.persistent_tasks_path);
        config.memory.knowledge_base = config.memory.knowledge_base.as_deref().map(expand_home);

        config.validate()?;
        Ok(config)
    }

    /// `~/.jarvis`
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".jarvis")
    }

    /// `~/.jarvis/config.toml`
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::ValidationError(
                "model.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.model.max_output_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "model.max_output_tokens must be at least 1".into(),
            ));
        }

        if self.memory.conversation_history == 0 {
            return Err(ConfigError::ValidationError(
                "memory.conversation_history must be at least 1".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(ConfigError::ValidationError(
                "audio.volume must be between 0.0 and 1.0".into(),
            ));
        }

        Ok(())
    }

    /// Check if a credential is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Create the directories that hold persistent skill data.
    pub fn ensure_data_dirs(&self) -> std::io::Result<()> {
        if let Some(parent) = self.memory.persistent_tasks_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if let Some(parent) = self.memory.knowledge_path().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Generate a default config TOML string (for `onboard`).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            persona: default_persona(),
            api_key: None,
            skills: default_skills(),
            tools_enabled: true,
            model: ModelConfig::default(),
            audio: AudioConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    if !path.exists() {
        tracing::info!("No config file found at {}, using defaults", path.display());
        return Ok(toml::Table::new());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    content.parse::<toml::Table>().map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Layer `JARVIS_*` variables onto a parsed config table.
///
/// `__` separates nesting levels and keys are lowercased. `JARVIS_CONFIG`
/// names the file itself and is skipped.
pub fn apply_env_overrides<I>(table: &mut toml::Table, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, raw) in vars {
        if key == CONFIG_ENV_VAR {
            continue;
        }
        let Some(rest) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let path: Vec<String> = rest.to_lowercase().split("__").map(String::from).collect();
        if path.iter().any(|p| p.is_empty()) {
            continue;
        }

        let mut cursor = &mut *table;
        for part in &path[..path.len() - 1] {
            let entry = cursor
                .entry(part.clone())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            if !entry.is_table() {
                *entry = toml::Value::Table(toml::Table::new());
            }
            cursor = match entry {
                toml::Value::Table(t) => t,
                _ => unreachable!("entry was just replaced by a table"),
            };
        }

        let value = if STRING_KEYS.contains(&path.join(".").as_str()) {
            toml::Value::String(raw)
        } else {
            parse_env_value(&raw)
        };
        let leaf = path[path.len() - 1].clone();
        tracing::debug!(key = %key, "Applying environment override");
        cursor.insert(leaf, value);
    }
}

/// Interpret an environment value as a TOML scalar when it parses as one
/// (`0.7`, `8`, `true`, `["a", "b"]`), else as a plain string.
fn parse_env_value(raw: &str) -> toml::Value {
    format!("value = {raw}")
        .parse::<toml::Table>()
        .ok()
        .and_then(|mut t| t.remove("value"))
        .filter(|v| !v.is_datetime())
        .unwrap_or_else(|| toml::Value::String(raw.to_string()))
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs_home().join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
