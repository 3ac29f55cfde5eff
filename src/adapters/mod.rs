//! Chat-platform adapters
//!
//! This module provides the transport abstraction the notifier core talks
//! to, and its Telegram Bot API implementation.

pub mod errors;
pub mod telegram;
pub mod traits;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types for convenience
pub use errors::{TransportError, TransportResult};
pub use telegram::{poll_updates, TelegramApi};
pub use traits::ChannelTransport;
pub use types::{BotIdentity, ChatId, InboundMessage};
