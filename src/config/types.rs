//! Configuration types for the notifier
//!
//! This module defines all configuration structs that are loaded from YAML
//! once at startup and shared across tasks via `Arc<AppConfig>`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

// ============================================================================
// Type Aliases
// ============================================================================

/// Type alias for read-only configuration shared across async tasks
pub type SharedConfig = Arc<AppConfig>;

/// Placeholder values shipped in the sample config; rejected by `validate()`
const TOKEN_PLACEHOLDER: &str = "YOUR_BOT_TOKEN_HERE";
const CHANNEL_PLACEHOLDER: &str = "@your_channel_name";

// ============================================================================
// Configuration Structs
// ============================================================================

/// Telegram transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API credential (may be supplied via `TELEGRAM_BOT_TOKEN`)
    #[serde(default)]
    pub bot_token: String,
    /// Target broadcast channel (`@channel_name` or `-1001234567890`)
    #[serde(default)]
    pub channel_id: String,
    /// Operator identities allowed to issue commands. Empty = everyone.
    #[serde(default)]
    pub admin_user_ids: Vec<i64>,
    /// Bot API base URL (overridable for tests and self-hosted API servers)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Long-poll timeout for `getUpdates` in seconds
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

/// Data origins, tried in the order journal -> url -> file -> sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// NDJSON journal file; the newest record is pushed
    #[serde(default)]
    pub journal_path: Option<PathBuf>,
    /// HTTP endpoint fetched with GET
    #[serde(default)]
    pub url: Option<String>,
    /// Local text file
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    /// Upper bound for a single origin fetch
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

/// Push cycle behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Seconds between scheduled pushes
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Transport hard limit for one message
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// Whether the scheduler starts enabled
    #[serde(default = "default_auto_push")]
    pub auto_push: bool,
    /// Pause between chunks of a multi-part report
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,
    /// Pause after a failed cycle before the scheduler retries
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: u64,
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub push: PushConfig,
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout_secs() -> u64 {
    30
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_interval_secs() -> u64 {
    60
}

fn default_max_message_length() -> usize {
    4096
}

fn default_auto_push() -> bool {
    true
}

fn default_chunk_delay_ms() -> u64 {
    500
}

fn default_retry_backoff_secs() -> u64 {
    5
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel_id: String::new(),
            admin_user_ids: Vec::new(),
            api_base_url: default_api_base_url(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            journal_path: None,
            url: None,
            file_path: None,
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_message_length: default_max_message_length(),
            auto_push: default_auto_push(),
            chunk_delay_ms: default_chunk_delay_ms(),
            retry_backoff_secs: default_retry_backoff_secs(),
        }
    }
}

impl SourcesConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl PushConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_secs)
    }
}

impl AppConfig {
    /// Overlay credentials from the environment.
    ///
    /// `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHANNEL_ID` win over file values so
    /// the token can stay out of the YAML.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            if !token.trim().is_empty() {
                self.telegram.bot_token = token;
            }
        }
        if let Ok(channel) = std::env::var("TELEGRAM_CHANNEL_ID") {
            if !channel.trim().is_empty() {
                self.telegram.channel_id = channel;
            }
        }
    }

    /// Validate all configuration rules
    pub fn validate(&self) -> Result<()> {
        let token = self.telegram.bot_token.trim();
        if token.is_empty() || token == TOKEN_PLACEHOLDER {
            return Err(AppError::Config(
                "telegram.bot_token must be configured (or set TELEGRAM_BOT_TOKEN)".to_string(),
            ));
        }

        let channel = self.telegram.channel_id.trim();
        if channel.is_empty() || channel == CHANNEL_PLACEHOLDER {
            return Err(AppError::Config(
                "telegram.channel_id must be configured (or set TELEGRAM_CHANNEL_ID)".to_string(),
            ));
        }

        if self.push.interval_secs == 0 {
            return Err(AppError::Config(
                "push.interval_secs must be > 0".to_string(),
            ));
        }

        // The chunker keeps a 100-character margin below the limit
        if self.push.max_message_length <= 100 {
            return Err(AppError::Config(format!(
                "push.max_message_length must be > 100 (got {})",
                self.push.max_message_length
            )));
        }

        if self.sources.fetch_timeout_secs == 0 {
            return Err(AppError::Config(
                "sources.fetch_timeout_secs must be > 0".to_string(),
            ));
        }

        if let Some(url) = &self.sources.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AppError::Config(format!(
                    "sources.url must be an http(s) URL (got '{}')",
                    url
                )));
            }
        }

        Ok(())
    }

    /// Convert to shared wrapper for async access
    pub fn into_shared(self) -> SharedConfig {
        Arc::new(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
