//! Serde types for the Telegram Bot API.
//!
//! Only the fields the notifier reads are deserialized; unknown fields are
//! ignored.

use serde::Deserialize;

use crate::adapters::types::InboundMessage;

/// Generic Bot API response envelope
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub description: Option<String>,
    pub error_code: Option<i64>,
    pub result: Option<T>,
    pub parameters: Option<ResponseParameters>,
}

/// Extra error details (flood control)
#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    pub retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub channel_post: Option<Message>,
}

impl Update {
    /// The message carried by this update, whichever kind it is
    pub fn into_message(self) -> Option<Message> {
        self.message.or(self.channel_post)
    }
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: String,
    pub title: Option<String>,
}

/// `getMe` result
#[derive(Debug, Deserialize)]
pub struct BotUser {
    pub id: i64,
    pub username: Option<String>,
}

/// `sendMessage` result (only the id is needed)
#[derive(Debug, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}

impl From<Message> for InboundMessage {
    fn from(msg: Message) -> Self {
        let sender_name = match &msg.from {
            Some(user) => match &user.username {
                Some(username) => format!("{} (@{})", user.first_name, username),
                None => user.first_name.clone(),
            },
            None => msg
                .chat
                .title
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
        };

        InboundMessage {
            message_id: msg.message_id,
            chat_id: msg.chat.id,
            chat_kind: msg.chat.chat_type,
            sender_id: msg.from.as_ref().map(|u| u.id),
            sender_name,
            text: msg.text,
        }
    }
}
