//! Transport-neutral types shared by the core and the adapters

use std::fmt;

use serde::Serialize;

/// Destination of an outbound message.
///
/// Telegram accepts either a numeric chat id or a public `@username`.
/// Only ever serialized; it is parsed from config with [`ChatId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChatId {
    Id(i64),
    Username(String),
}

impl ChatId {
    /// Parse a configured channel identifier.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(id) => ChatId::Id(id),
            Err(_) => ChatId::Username(raw.to_string()),
        }
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatId::Id(id) => write!(f, "{}", id),
            ChatId::Username(name) => write!(f, "{}", name),
        }
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        ChatId::Id(id)
    }
}

/// The bot's own account, as reported by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: i64,
    pub username: String,
}

/// One inbound message delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub message_id: i64,
    pub chat_id: i64,
    /// `private`, `group`, `supergroup` or `channel`
    pub chat_kind: String,
    /// Absent for channel posts
    pub sender_id: Option<i64>,
    pub sender_name: String,
    /// `None` for media, stickers and other non-text content
    pub text: Option<String>,
}
