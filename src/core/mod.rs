//! Core module - push pipeline, scheduler, command dispatch, history, logging
//!
//! This module uses **explicit re-exports** instead of glob exports
//! (`pub use module::*`) so the public API only changes on purpose.
//!
//! ## Usage
//! Prefer importing from `crate::core`:
//! ```ignore
//! use crate::core::{AutoPushScheduler, CommandDispatcher, PushPipeline};
//! ```
//!
//! ## Adding New Public Types
//! When adding new public types to submodules, explicitly add them to the
//! re-exports below to make them part of the public API.

pub mod channels;
pub mod chunker;
pub mod commands;
pub mod format;
pub mod history;
pub mod logging;
pub mod pipeline;
pub mod runtime;
pub mod scheduler;
pub mod sender;

// Explicit re-exports for channels module
pub use channels::{ChannelBundle, DEFAULT_CHANNEL_CAPACITY};

// Explicit re-exports for chunker module
pub use chunker::{balance_markup, split_html, split_message};

// Explicit re-exports for commands module
pub use commands::{Classified, Command, CommandDispatcher, REJECTION_TEXT};

// Explicit re-exports for format module
pub use format::{escape_html, render_report, render_startup};

// Explicit re-exports for history module
pub use history::{HistoryBuffer, ReceivedMessage};

// Explicit re-exports for logging module
pub use logging::{
    init_logging, init_logging_with_config, redact_bot_url, LoggingConfig, SanitizedValue,
    DEFAULT_LOG_LEVEL,
};

// Explicit re-exports for pipeline module
pub use pipeline::PushPipeline;

// Explicit re-exports for runtime module
pub use runtime::{announce_startup, update_loop};

// Explicit re-exports for scheduler module
pub use scheduler::{AutoPushScheduler, SchedulerState};

// Explicit re-exports for sender module
pub use sender::ChannelSender;
