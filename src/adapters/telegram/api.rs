//! Raw HTTP calls to the Telegram Bot API.
//!
//! Wraps reqwest for `sendMessage`, `getMe` and `getUpdates`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::adapters::errors::{TransportError, TransportResult};
use crate::adapters::traits::ChannelTransport;
use crate::adapters::types::{BotIdentity, ChatId};

use super::types::{ApiResponse, BotUser, SentMessage, Update};

/// Default timeout for non-polling requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Slack added on top of the long-poll timeout for `getUpdates`
const POLL_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

/// Low-level Telegram Bot API client.
pub struct TelegramApi {
    client: Client,
    base_url: String,
}

impl TelegramApi {
    /// Create an API client rooted at `base_url` (`https://api.telegram.org` in production).
    pub fn with_base_url(bot_token: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{}/bot{}", base_url.trim_end_matches('/'), bot_token),
        }
    }

    /// Long-poll for new updates.
    ///
    /// `offset` should be `last_update_id + 1` to acknowledge earlier updates;
    /// `-1` returns only the newest pending update.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> TransportResult<Vec<Update>> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message", "channel_post"],
        });
        if let Some(off) = offset {
            body["offset"] = json!(off);
        }

        let timeout = Duration::from_secs(timeout_secs) + POLL_TIMEOUT_SLACK;
        self.call("getUpdates", body, timeout).await
    }

    async fn post_text(&self, chat: &ChatId, text: &str, reply_to: Option<i64>) -> TransportResult<i64> {
        let mut body = json!({
            "chat_id": chat,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });
        if let Some(id) = reply_to {
            body["reply_to_message_id"] = json!(id);
            body["allow_sending_without_reply"] = json!(true);
        }

        debug!(chat = %chat, len = text.chars().count(), reply_to, "sendMessage");

        let sent: SentMessage = self.call("sendMessage", body, REQUEST_TIMEOUT).await?;
        Ok(sent.message_id)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value, timeout: Duration) -> TransportResult<T> {
        let resp = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .timeout(timeout)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let api_resp: ApiResponse<T> = resp.json().await.map_err(|e| {
            TransportError::InvalidResponse(format!("{} returned HTTP {}: {}", method, status, e))
        })?;

        if !api_resp.ok {
            let retry_after = api_resp.parameters.and_then(|p| p.retry_after);
            if let Some(retry_after) = retry_after {
                warn!(method, retry_after, "Bot API flood control");
                return Err(TransportError::RateLimited { retry_after });
            }
            let description = api_resp.description.unwrap_or_default();
            warn!(method, code = ?api_resp.error_code, "{} failed: {}", method, description);
            return Err(TransportError::Api {
                code: api_resp.error_code,
                description,
            });
        }

        api_resp
            .result
            .ok_or_else(|| TransportError::InvalidResponse(format!("{} response without result", method)))
    }
}

#[async_trait]
impl ChannelTransport for TelegramApi {
    async fn send_message(&self, chat: &ChatId, text: &str) -> TransportResult<i64> {
        self.post_text(chat, text, None).await
    }

    async fn send_reply(&self, chat: &ChatId, reply_to: i64, text: &str) -> TransportResult<i64> {
        self.post_text(chat, text, Some(reply_to)).await
    }

    async fn get_me(&self) -> TransportResult<BotIdentity> {
        let me: BotUser = self.call("getMe", json!({}), REQUEST_TIMEOUT).await?;
        Ok(BotIdentity {
            id: me.id,
            username: me.username.unwrap_or_default(),
        })
    }
}
