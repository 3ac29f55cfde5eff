//! Logging setup for the notifier
//!
//! Structured logging with `tracing`:
//! - JSON output by default, for log aggregation
//! - Pretty output for development (`LOG_FORMAT=pretty`)
//! - Level filter from `RUST_LOG`
//! - Redaction of the bot credential and other secrets
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RUST_LOG` | `channel_notifier=info` | Log level filter |
//! | `LOG_FORMAT` | `json` | Output format: `json` or `pretty` |
//!
//! ```rust,ignore
//! use channel_notifier::core::logging::{init_logging, SanitizedValue};
//!
//! init_logging();
//! tracing::info!(token = %SanitizedValue::new(&config.telegram.bot_token), "Connecting");
//! // token = "1234...REDACTED"
//! ```

use std::env;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::{fmt as ts_fmt, fmt::format::FmtSpan, prelude::*, EnvFilter};

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Default log level when RUST_LOG is not set
pub const DEFAULT_LOG_LEVEL: &str = "channel_notifier=info";

/// Redacting wrapper for secrets.
///
/// Values longer than 8 characters keep their first 4 characters; anything
/// shorter is fully redacted. `Debug` never shows the value.
#[derive(Clone)]
pub struct SanitizedValue<'a>(&'a str);

impl<'a> SanitizedValue<'a> {
    pub fn new(value: &'a str) -> Self {
        Self(value)
    }
}

impl fmt::Display for SanitizedValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.chars().count() > 8 {
            let head: String = self.0.chars().take(4).collect();
            write!(f, "{}...REDACTED", head)
        } else {
            write!(f, "REDACTED")
        }
    }
}

impl fmt::Debug for SanitizedValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SanitizedValue(***)")
    }
}

/// Strip the credential segment out of a Bot API URL (`.../bot<token>/...`).
pub fn redact_bot_url(url: &str) -> String {
    match url.find("/bot") {
        Some(start) => {
            let token_start = start + "/bot".len();
            let token_end = url[token_start..]
                .find('/')
                .map(|i| token_start + i)
                .unwrap_or(url.len());
            format!("{}/bot<redacted>{}", &url[..start], &url[token_end..])
        }
        None => url.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter string, e.g. `channel_notifier=debug,reqwest=warn`
    pub level_filter: String,
    pub use_pretty_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level_filter: DEFAULT_LOG_LEVEL.to_string(),
            use_pretty_format: false,
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG` and `LOG_FORMAT`.
    pub fn from_env() -> Self {
        let level_filter = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
        let use_pretty_format = env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("pretty"))
            .unwrap_or(false);

        Self {
            level_filter,
            use_pretty_format,
        }
    }
}

/// Initialize logging from the environment. Later calls are no-ops.
pub fn init_logging() {
    init_logging_with_config(LoggingConfig::from_env());
}

pub fn init_logging_with_config(config: LoggingConfig) {
    if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    let env_filter = EnvFilter::try_new(&config.level_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if config.use_pretty_format {
        tracing_subscriber::registry()
            .with(
                ts_fmt::layer()
                    .pretty()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                ts_fmt::layer()
                    .json()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true)
                    .with_current_span(true),
            )
            .with(env_filter)
            .init();
    }
}
