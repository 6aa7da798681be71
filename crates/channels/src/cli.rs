//! CLI channel — interactive terminal-based chat.
//!
//! Reads from stdin, writes to stdout. Used for `jarvis agent` interactive
//! mode.

use async_trait::async_trait;
use jarvis_core::channel::{Channel, ChannelMessage};
use jarvis_core::error::ChannelError;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const CHANNEL_NAME: &str = "cli";

/// Interactive CLI channel for terminal-based chat.
pub struct CliChannel {
    /// Speaker label printed in front of every reply.
    label: String,
}

impl CliChannel {
    pub fn new() -> Self {
        Self::with_label("Jarvis")
    }

    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// How a reply is rendered on the terminal.
    pub fn render(&self, content: &str) -> String {
        format!("{}: {content}", self.label)
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Lines that end an interactive session.
pub fn is_exit_command(line: &str) -> bool {
    matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q")
}

/// Forward non-blank lines from `reader` until EOF or an exit command.
pub(crate) fn spawn_line_reader<R>(
    reader: R,
) -> mpsc::Receiver<Result<ChannelMessage, ChannelError>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        let mut lines = reader.lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    if is_exit_command(trimmed) {
                        break;
                    }

                    let msg = ChannelMessage::new(CHANNEL_NAME, line);
                    if tx.send(Ok(msg)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF (Ctrl+D)
                Err(e) => {
                    let _ = tx.send(Err(ChannelError::ConnectionLost(e.to_string()))).await;
                    break;
                }
            }
        }
    });

    rx
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        CHANNEL_NAME
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        Ok(spawn_line_reader(BufReader::new(io::stdin())))
    }

    async fn send(&self, content: &str) -> Result<(), ChannelError> {
        println!("{}", self.render(content));
        Ok(())
    }
}
