//! Task skill: a persistent reminder / todo list.
//!
//! Tasks are kept in memory and flushed to a pretty-printed JSON array on
//! every change. A missing file starts empty; a corrupt file is ignored with
//! a warning and overwritten on the next save.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use jarvis_core::context::ConversationContext;
use jarvis_core::error::SkillError;
use jarvis_core::intent::Intent;
use jarvis_core::skill::Skill;
use tokio::sync::RwLock;
use tracing::{debug, warn};

const ADD_INTENT: &str = "tasks.add";
const LIST_INTENT: &str = "tasks.list";

pub struct TaskSkill {
    path: PathBuf,
    tasks: RwLock<Vec<String>>,
}

impl TaskSkill {
    /// Open the task list stored at `path`.
    pub fn open(path: &Path) -> Result<Self, SkillError> {
        let tasks = Self::load_from_disk(path)?;
        debug!(path = %path.display(), count = tasks.len(), "Task list loaded");
        Ok(Self {
            path: path.to_path_buf(),
            tasks: RwLock::new(tasks),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current tasks in insertion order.
    pub async fn tasks(&self) -> Vec<String> {
        self.tasks.read().await.clone()
    }

    fn load_from_disk(path: &Path) -> Result<Vec<String>, SkillError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(SkillError::InitFailed {
                    skill: "tasks".into(),
                    reason: format!("cannot read {}: {e}", path.display()),
                });
            }
        };

        match serde_json::from_str::<Vec<serde_json::Value>>(&content) {
            Ok(items) => Ok(items
                .into_iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable task file");
                Ok(Vec::new())
            }
        }
    }

    fn flush(path: &Path, tasks: &[String]) -> Result<(), SkillError> {
        let failed = |reason: String| SkillError::ExecutionFailed {
            skill: "tasks".into(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| failed(format!("failed to create task directory: {e}")))?;
        }

        let content = serde_json::to_string_pretty(tasks)
            .map_err(|e| failed(format!("failed to serialize tasks: {e}")))?;
        std::fs::write(path, content)
            .map_err(|e| failed(format!("failed to write task file: {e}")))?;
        Ok(())
    }

    /// Append a task and persist the list.
    pub async fn add(&self, task: &str) -> Result<(), SkillError> {
        let mut tasks = self.tasks.write().await;
        tasks.push(task.to_string());
        if let Err(e) = Self::flush(&self.path, &tasks) {
            tasks.pop();
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl Skill for TaskSkill {
    fn name(&self) -> &str {
        "tasks"
    }

    fn description(&self) -> &str {
        "Manage reminders and todos."
    }

    fn can_handle(&self, intent: &Intent, _text: &str) -> bool {
        intent.category() == "tasks"
    }

    async fn handle(&self, intent: &Intent, text: &str, _context: &ConversationContext) -> String {
        match intent.name.as_str() {
            ADD_INTENT => {
                let task = intent.entity("task").unwrap_or(text).trim();
                if task.is_empty() {
                    return "What would you like me to remember?".into();
                }
                match self.add(task).await {
                    Ok(()) => format!("Task recorded: {task}"),
                    Err(e) => {
                        warn!(error = %e, "Task could not be saved");
                        format!("I couldn't save that task: {e}")
                    }
                }
            }
            LIST_INTENT => {
                let tasks = self.tasks.read().await;
                if tasks.is_empty() {
                    return "You have no tasks yet.".into();
                }
                let lines: Vec<String> = tasks.iter().map(|t| format!("- {t}")).collect();
                format!("Here are your tasks:\n{}", lines.join("\n"))
            }
            _ => "I couldn't process that task request.".into(),
        }
    }
}
