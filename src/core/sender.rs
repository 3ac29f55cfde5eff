//! Delivery of rendered reports to the broadcast channel

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::adapters::{ChannelTransport, ChatId};
use crate::core::chunker::split_html;

/// Sends reports to the configured channel, chunking and pacing as needed
pub struct ChannelSender {
    transport: Arc<dyn ChannelTransport>,
    channel: ChatId,
    max_message_length: usize,
    chunk_delay: Duration,
}

impl ChannelSender {
    pub fn new(
        transport: Arc<dyn ChannelTransport>,
        channel: ChatId,
        max_message_length: usize,
        chunk_delay: Duration,
    ) -> Self {
        Self {
            transport,
            channel,
            max_message_length,
            chunk_delay,
        }
    }

    pub fn channel(&self) -> &ChatId {
        &self.channel
    }

    /// Split `text` against the transport limit and deliver every part.
    ///
    /// Each part carries its own closing and reopening tags.
    pub async fn send_report(&self, text: &str) -> bool {
        let chunks = split_html(text, self.max_message_length);
        self.deliver(&chunks).await
    }

    /// Deliver chunks strictly in order.
    ///
    /// A failed chunk does not stop the batch; the result is `true` only if
    /// every chunk went through.
    pub async fn deliver(&self, chunks: &[String]) -> bool {
        if let [single] = chunks {
            return match self.transport.send_message(&self.channel, single).await {
                Ok(_) => {
                    info!(channel = %self.channel, "[SEND] Message sent to channel");
                    true
                }
                Err(e) => {
                    error!(channel = %self.channel, error = %e, "[SEND] Failed to send message to channel");
                    false
                }
            };
        }

        let total = chunks.len();
        let mut all_delivered = true;

        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.chunk_delay).await;
            }

            match self.transport.send_message(&self.channel, chunk).await {
                Ok(_) => info!(part = i + 1, total, "[SEND] Message part sent to channel"),
                Err(e) => {
                    error!(part = i + 1, total, error = %e, "[SEND] Failed to send message part");
                    all_delivered = false;
                }
            }
        }

        all_delivered
    }
}
