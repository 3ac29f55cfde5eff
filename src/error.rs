//! Application-wide error types using thiserror
//!
//! Layer-specific errors (`TransportError`, `OriginError`) convert into
//! `AppError` so callers can propagate with `?`.

use thiserror::Error;

use crate::adapters::errors::TransportError;
use crate::sources::OriginError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Source error: {0}")]
    Source(#[from] OriginError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
