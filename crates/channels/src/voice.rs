//! Voice channel — wake-word gated speech conversation.
//!
//! Audio capture, recognition and synthesis live behind [`SpeechBackend`].
//! This channel only implements the conversation protocol: wait for a phrase
//! containing the wake word, listen once for the request, forward it.

use std::sync::Arc;

use async_trait::async_trait;
use jarvis_core::channel::{Channel, ChannelMessage};
use jarvis_core::error::ChannelError;
use tokio::sync::mpsc;
use tracing::{debug, info};

const CHANNEL_NAME: &str = "voice";

/// Spoken when the request after the wake word is not understood.
pub const NOT_CAUGHT: &str = "I didn't catch that.";

/// A speech recognition + synthesis engine.
#[async_trait]
pub trait SpeechBackend: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Listen for one phrase. `Ok(None)` means nothing intelligible was
    /// heard; an error ends the voice session.
    async fn listen(&self) -> Result<Option<String>, ChannelError>;

    /// Say `text` out loud.
    async fn speak(&self, text: &str) -> Result<(), ChannelError>;
}

pub struct VoiceChannel<S: SpeechBackend> {
    backend: Arc<S>,
    /// Lowercase; empty disables gating.
    wake_word: String,
}

impl<S: SpeechBackend> VoiceChannel<S> {
    pub fn new(backend: S, wake_word: &str) -> Self {
        Self {
            backend: Arc::new(backend),
            wake_word: wake_word.trim().to_lowercase(),
        }
    }

    pub fn wake_word(&self) -> &str {
        &self.wake_word
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }
}

/// Whether a heard phrase contains the wake word (case-insensitive).
pub fn contains_wake_word(heard: &str, wake_word: &str) -> bool {
    wake_word.is_empty() || heard.to_lowercase().contains(wake_word)
}

#[async_trait]
impl<S: SpeechBackend> Channel for VoiceChannel<S> {
    fn name(&self) -> &str {
        CHANNEL_NAME
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        let (tx, rx) = mpsc::channel(8);
        let backend = self.backend.clone();
        let wake_word = self.wake_word.clone();

        info!(backend = %backend.name(), wake_word = %wake_word, "Listening for wake word");

        tokio::spawn(async move {
            loop {
                let heard = match backend.listen().await {
                    Ok(Some(heard)) => heard,
                    Ok(None) => continue,
                    Err(e) => {
                        let _ = tx.send(Err(e)).await;
                        break;
                    }
                };

                if !contains_wake_word(&heard, &wake_word) {
                    debug!(heard = %heard, "Ignoring phrase without wake word");
                    continue;
                }
                info!("Wake word detected");

                let request = match backend.listen().await {
                    Ok(Some(request)) if !request.trim().is_empty() => request,
                    Ok(_) => {
                        if let Err(e) = backend.speak(NOT_CAUGHT).await {
                            debug!(error = %e, "Could not speak prompt");
                        }
                        continue;
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e)).await;
                        break;
                    }
                };

                let msg = ChannelMessage::new(CHANNEL_NAME, request.trim());
                if tx.send(Ok(msg)).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, content: &str) -> Result<(), ChannelError> {
        println!("Jarvis: {content}");
        self.backend
            .speak(content)
            .await
            .map_err(|e| ChannelError::DeliveryFailed {
                channel: CHANNEL_NAME.into(),
                reason: e.to_string(),
            })
    }
}
