//! Transport error types
//!
//! All chat-platform errors are wrapped in TransportError which
//! implements thiserror for consistent error handling.

use thiserror::Error;

use crate::core::logging::redact_bot_url;

/// Transport-level errors for Bot API operations
#[derive(Error, Debug)]
pub enum TransportError {
    /// Request never produced a usable HTTP response.
    ///
    /// reqwest puts the request URL, token included, in its message.
    #[error("Network error: {}", redact_bot_url(&.0.to_string()))]
    Network(#[from] reqwest::Error),

    /// The Bot API answered `ok: false`
    #[error("API error{}: {description}", code.map(|c| format!(" {}", c)).unwrap_or_default())]
    Api {
        code: Option<i64>,
        description: String,
    },

    /// Flood control; the API asks to wait `retry_after` seconds
    #[error("Rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    /// Invalid or unexpected response body
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;
