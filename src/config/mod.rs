//! Configuration module for notifier settings and YAML loading
//!
//! This module provides:
//! - Configuration types (`AppConfig`, `TelegramConfig`, `SourcesConfig`, `PushConfig`)
//! - YAML loading functionality (`load_config`)
//! - Read-only shared wrapper (`SharedConfig`)
//! - Application constants with environment variable overrides

pub mod constants;
mod loader;
mod types;

// Re-export types
pub use types::{AppConfig, PushConfig, SharedConfig, SourcesConfig, TelegramConfig};

// Re-export loader functions
pub use loader::{load_config, load_config_from_str};
