//! Drives an [`Assistant`] from a [`Channel`] until the user leaves.

use jarvis_core::channel::Channel;
use jarvis_core::error::ChannelError;
use tracing::{debug, warn};

use crate::assistant::Assistant;

/// Typed or spoken to clear the conversation.
pub const RESET_COMMAND: &str = "/reset";

pub const RESET_REPLY: &str = "Conversation cleared.";

/// Relay utterances from `channel` to `assistant` and send back each reply.
///
/// Returns the number of utterances answered. A channel read error ends the
/// session; a failed send is logged and the session continues.
pub async fn converse<C>(assistant: &mut Assistant, channel: &C) -> Result<usize, ChannelError>
where
    C: Channel + ?Sized,
{
    let mut rx = channel.start().await?;
    let mut handled = 0;

    while let Some(item) = rx.recv().await {
        let msg = match item {
            Ok(msg) => msg,
            Err(e) => {
                warn!(channel = %channel.name(), error = %e, "Channel closed with error");
                break;
            }
        };

        let reply = if msg.content.trim() == RESET_COMMAND {
            assistant.reset();
            RESET_REPLY.to_string()
        } else {
            handled += 1;
            assistant.handle_text(&msg.content).await
        };

        if let Err(e) = channel.send(&reply).await {
            warn!(channel = %channel.name(), error = %e, "Reply could not be delivered");
        }
    }

    debug!(channel = %channel.name(), handled, "Session ended");
    Ok(handled)
}
