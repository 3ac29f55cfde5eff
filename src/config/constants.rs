//! Application-wide constants and configuration defaults
//!
//! This module centralizes the fixed policy values of the notifier.
//! Operational values can be overridden via environment variables.

use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Fixed Policy
// =============================================================================

/// Number of received messages kept in memory
pub const HISTORY_CAPACITY: usize = 50;

/// Number of history entries shown by `/messages`
pub const RECENT_MESSAGES_SHOWN: usize = 5;

/// Message bodies longer than this are truncated in `/messages`
pub const MESSAGE_PREVIEW_CHARS: usize = 100;

/// Split point margin below the transport limit, leaves room for markup
pub const CHUNK_SAFETY_MARGIN: usize = 100;

/// Keywords (lowercase) that trigger the auto-reply on inbound messages
pub const AUTO_REPLY_KEYWORDS: &[&str] = &["help", "status", "info"];

/// Stored in history in place of text for media/file messages
pub const NON_TEXT_PLACEHOLDER: &str = "[Media/File]";

/// Timestamp format used in reports and history entries
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Scheduler wait-phase granularity; disable requests are honored within this
pub fn wait_poll_granularity() -> Duration {
    Duration::from_secs(1)
}

// =============================================================================
// Environment Overrides
// =============================================================================

/// Configuration file path (default: `config.yaml`)
///
/// Environment variable: `CONFIG_PATH`
pub fn config_path() -> PathBuf {
    std::env::var("CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.yaml"))
}

/// Capacity of the inbound update channel (default: 100)
///
/// Environment variable: `UPDATE_CHANNEL_CAPACITY`
pub fn update_channel_capacity() -> usize {
    std::env::var("UPDATE_CHANNEL_CAPACITY")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(100)
}

/// Upper bound for the poller's exponential backoff (default: 60 seconds)
///
/// Environment variable: `POLL_MAX_BACKOFF_SECS`
pub fn poll_max_backoff() -> Duration {
    let secs = std::env::var("POLL_MAX_BACKOFF_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(60);
    Duration::from_secs(secs)
}

/// Log all current configuration values at startup
pub fn log_configuration() {
    tracing::info!("=== Notifier Configuration ===");
    tracing::info!("  - Config path: {}", config_path().display());
    tracing::info!("  - History capacity: {}", HISTORY_CAPACITY);
    tracing::info!("  - Update channel capacity: {}", update_channel_capacity());
    tracing::info!("  - Poll max backoff: {:?}", poll_max_backoff());
    tracing::info!("==============================");
}
