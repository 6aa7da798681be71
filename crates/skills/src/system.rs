//! System skill: run a small allowlist of local commands and report
//! basic diagnostics.
//!
//! Commands are spawned directly (never through a shell) and only when the
//! requested text starts with one of the allowlisted triggers.

use std::time::Duration;

use async_trait::async_trait;
use jarvis_core::context::ConversationContext;
use jarvis_core::intent::Intent;
use jarvis_core::provider::ToolDefinition;
use jarvis_core::skill::Skill;
use tokio::process::Command;
use tracing::{debug, warn};

const RUN_INTENT: &str = "system.run";
const KEYWORDS: &[&str] = &["system", "computer", "status"];
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// One entry of the allowlist.
#[derive(Debug, Clone)]
pub struct AllowedCommand {
    /// Prefix the user's command text must start with (lowercase).
    pub trigger: String,
    pub program: String,
    pub args: Vec<String>,
    pub description: String,
}

impl AllowedCommand {
    pub fn new(trigger: &str, program: &str, args: &[&str], description: &str) -> Self {
        Self {
            trigger: trigger.to_lowercase(),
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            description: description.into(),
        }
    }
}

fn default_allowlist() -> Vec<AllowedCommand> {
    vec![
        AllowedCommand::new("list", "ls", &[], "List files in the current directory."),
        AllowedCommand::new("status", "uptime", &[], "Show system uptime (Linux/macOS)."),
        AllowedCommand::new(
            "open logs",
            "tail",
            &["-n", "50", "system.log"],
            "Tail a generic log file (if present).",
        ),
    ]
}

pub struct SystemSkill {
    allowlist: Vec<AllowedCommand>,
    timeout: Duration,
}

impl SystemSkill {
    pub fn new() -> Self {
        Self::with_allowlist(default_allowlist())
    }

    pub fn with_allowlist(allowlist: Vec<AllowedCommand>) -> Self {
        Self {
            allowlist,
            timeout: COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn find_allowed(&self, command_text: &str) -> Option<&AllowedCommand> {
        let lowered = command_text.to_lowercase();
        self.allowlist.iter().find(|c| lowered.starts_with(&c.trigger))
    }

    async fn execute(&self, command_text: &str) -> String {
        let command_text = command_text.trim();
        if command_text.is_empty() {
            return "I need a command to execute.".into();
        }

        let Some(allowed) = self.find_allowed(command_text) else {
            debug!(command = %command_text, "Command not in allowlist");
            return "For safety I only run predefined commands. Try 'list' or 'status'.".into();
        };

        debug!(program = %allowed.program, args = ?allowed.args, "Executing allowlisted command");

        let run = Command::new(&allowed.program)
            .args(&allowed.args)
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, run).await {
            Err(_) => {
                warn!(program = %allowed.program, "Command timed out");
                return format!(
                    "The command did not finish within {} seconds.",
                    self.timeout.as_secs()
                );
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return "Command is not available on this system.".into();
            }
            Ok(Err(e)) => {
                warn!(program = %allowed.program, error = %e, "Command failed to start");
                return format!("The command could not be started: {e}");
            }
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                program = %allowed.program,
                exit_code = output.status.code().unwrap_or(-1),
                "Command failed"
            );
            return format!("The command exited with an error: {}", stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if stdout.is_empty() {
            "Command executed successfully.".into()
        } else {
            stdout.to_string()
        }
    }

    fn diagnostics(&self) -> String {
        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "unknown".into());
        let allowed: Vec<&str> = self.allowlist.iter().map(|c| c.trigger.as_str()).collect();
        format!(
            "System diagnostics:\n- Platform: {}-{}\n- Working directory: {}\n- Allowed commands: {}",
            std::env::consts::OS,
            std::env::consts::ARCH,
            cwd,
            allowed.join(", ")
        )
    }
}

impl Default for SystemSkill {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Skill for SystemSkill {
    fn name(&self) -> &str {
        "system"
    }

    fn description(&self) -> &str {
        "Execute safe local commands and report system status."
    }

    fn can_handle(&self, intent: &Intent, text: &str) -> bool {
        if intent.is(RUN_INTENT) {
            return true;
        }
        let lowered = text.to_lowercase();
        KEYWORDS.iter().any(|k| lowered.contains(k))
    }

    async fn handle(&self, intent: &Intent, _text: &str, _context: &ConversationContext) -> String {
        if intent.is(RUN_INTENT) {
            return self.execute(intent.entity("command").unwrap_or("")).await;
        }
        self.diagnostics()
    }

    fn tool_spec(&self) -> Option<ToolDefinition> {
        let triggers: Vec<&str> = self.allowlist.iter().map(|c| c.trigger.as_str()).collect();
        Some(ToolDefinition {
            name: "system".into(),
            description: self.description().into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "The predefined command to run",
                        "enum": triggers
                    }
                },
                "required": ["command"]
            }),
        })
    }
}
