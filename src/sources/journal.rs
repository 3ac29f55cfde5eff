//! Journal origin
//!
//! A journal is an append-only NDJSON file: one JSON record per line, newest
//! last. The reader hands back the newest record; the core turns it into
//! payload text with [`record_to_payload`].

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::OriginError;

/// Reader for a structured record journal
///
/// Implementations may block; callers run them on the blocking pool.
pub trait JournalReader: Send {
    /// Newest record currently in the journal
    fn read(&mut self) -> Result<Value, OriginError>;
}

/// Journal stored as newline-delimited JSON on local disk
#[derive(Debug, Clone)]
pub struct NdjsonJournal {
    path: PathBuf,
}

impl NdjsonJournal {
    pub fn init(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl JournalReader for NdjsonJournal {
    fn read(&mut self) -> Result<Value, OriginError> {
        let content = fs::read_to_string(&self.path)?;

        let Some(last) = content.lines().rev().find(|line| !line.trim().is_empty()) else {
            return Ok(Value::Null);
        };

        serde_json::from_str(last)
            .map_err(|e| OriginError::Parse(format!("journal record: {}", e)))
    }
}

/// Serialize a journal record into payload text.
///
/// `null`, `{}`, `[]` and blank strings count as no content.
pub fn record_to_payload(record: &Value) -> Result<String, OriginError> {
    let empty = match record {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    };
    if empty {
        return Err(OriginError::Empty);
    }

    match record {
        Value::String(s) => Ok(s.clone()),
        other => Ok(serde_json::to_string(other)
            .map_err(|e| OriginError::Parse(e.to_string()))?),
    }
}
