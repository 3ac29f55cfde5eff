//! Transport trait definition
//!
//! The ChannelTransport trait is the seam between the notifier core and the
//! chat platform. Connection lifecycle and authentication stay behind it.

use async_trait::async_trait;

use crate::adapters::errors::TransportResult;
use crate::adapters::types::{BotIdentity, ChatId};

/// Outbound side of a chat platform
///
/// # Example Implementation
///
/// ```ignore
/// use async_trait::async_trait;
///
/// struct ConsoleTransport;
///
/// #[async_trait]
/// impl ChannelTransport for ConsoleTransport {
///     async fn send_message(&self, chat: &ChatId, text: &str) -> TransportResult<i64> {
///         println!("[{}] {}", chat, text);
///         Ok(0)
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Send one HTML-formatted message, returning the platform message id.
    ///
    /// Callers are responsible for keeping `text` within the platform limit.
    async fn send_message(&self, chat: &ChatId, text: &str) -> TransportResult<i64>;

    /// Send `text` threaded under message `reply_to` of the same chat.
    ///
    /// A reply target that no longer exists must not fail the send.
    async fn send_reply(&self, chat: &ChatId, reply_to: i64, text: &str) -> TransportResult<i64>;

    /// Identity of the bot account behind this transport
    async fn get_me(&self) -> TransportResult<BotIdentity>;
}
