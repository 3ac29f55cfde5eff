//! Channel notifier
//!
//! Pushes periodic data reports to a Telegram channel and takes operator
//! commands over the same bot:
//! - Data acquisition with ordered fallback (journal, HTTP, file, sample)
//! - Report formatting and length-safe chunking
//! - Auto-push scheduler with prompt disable and cancellable shutdown
//! - Allow-list gated commands and a bounded history of received messages

pub mod adapters;
pub mod config;
pub mod core;
pub mod error;
pub mod sources;

pub use error::AppError;
