//! Data acquisition with ordered fallback
//!
//! Origins are tried in fixed priority: journal, HTTP endpoint, local file.
//! Each returns `Result<String, OriginError>`; the first non-empty success
//! wins. When every configured origin fails, a generated sample is returned,
//! so [`DataSource::acquire`] has no error path.

pub mod journal;
pub mod sample;

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::SourcesConfig;

pub use journal::{record_to_payload, JournalReader, NdjsonJournal};
pub use sample::generate_sample;

/// Why a single origin produced no payload
#[derive(Debug, Error)]
pub enum OriginError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no content")]
    Empty,
}

/// One configured origin in the fallback chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Journal(PathBuf),
    Url(String),
    File(PathBuf),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Journal(path) => write!(f, "journal:{}", path.display()),
            Origin::Url(url) => write!(f, "url:{}", url),
            Origin::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}

type SharedJournal = Arc<Mutex<Box<dyn JournalReader>>>;

/// Payload acquisition over the configured origins
pub struct DataSource {
    config: SourcesConfig,
    client: reqwest::Client,
    journal: Option<SharedJournal>,
}

impl DataSource {
    pub fn new(config: SourcesConfig) -> Self {
        let journal = config
            .journal_path
            .as_ref()
            .map(|path| Box::new(NdjsonJournal::init(path)) as Box<dyn JournalReader>);
        Self::build(config, journal)
    }

    /// Use a custom journal binding instead of the NDJSON file reader
    pub fn with_journal(config: SourcesConfig, reader: Box<dyn JournalReader>) -> Self {
        Self::build(config, Some(reader))
    }

    fn build(config: SourcesConfig, journal: Option<Box<dyn JournalReader>>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            journal: journal.map(|reader| Arc::new(Mutex::new(reader))),
        }
    }

    /// Configured origins in priority order
    pub fn origins(&self) -> Vec<Origin> {
        let mut origins = Vec::with_capacity(3);
        if self.journal.is_some() {
            let path = self.config.journal_path.clone().unwrap_or_default();
            origins.push(Origin::Journal(path));
        }
        if let Some(url) = &self.config.url {
            origins.push(Origin::Url(url.clone()));
        }
        if let Some(path) = &self.config.file_path {
            origins.push(Origin::File(path.clone()));
        }
        origins
    }

    /// Human-readable label of the configured source, shown in reports
    pub fn label(&self) -> String {
        if let Some(path) = &self.config.journal_path {
            format!("Journal ({})", path.display())
        } else if let Some(url) = &self.config.url {
            format!("API Endpoint ({})", url)
        } else if let Some(path) = &self.config.file_path {
            format!("Local File ({})", path.display())
        } else {
            "Sample Data".to_string()
        }
    }

    /// Acquire a payload. Never fails.
    pub async fn acquire(&self) -> String {
        for origin in self.origins() {
            match self.try_origin(&origin).await {
                Ok(payload) => {
                    info!(origin = %origin, chars = payload.chars().count(), "[SOURCE] Payload acquired");
                    return payload;
                }
                Err(e) => {
                    warn!(origin = %origin, error = %e, "[SOURCE] Origin failed, trying next");
                }
            }
        }

        info!("[SOURCE] Falling back to generated sample");
        generate_sample(&chrono::Local::now())
    }

    /// Fetch from one origin, bounded by the configured timeout
    pub async fn try_origin(&self, origin: &Origin) -> Result<String, OriginError> {
        let limit = self.config.fetch_timeout();
        let payload = tokio::time::timeout(limit, self.fetch(origin))
            .await
            .map_err(|_| OriginError::Timeout(limit))??;

        if payload.trim().is_empty() {
            return Err(OriginError::Empty);
        }
        Ok(payload)
    }

    async fn fetch(&self, origin: &Origin) -> Result<String, OriginError> {
        match origin {
            Origin::Journal(_) => self.read_journal().await,
            Origin::Url(url) => self.read_url(url).await,
            Origin::File(path) => Ok(tokio::fs::read_to_string(path).await?),
        }
    }

    async fn read_journal(&self) -> Result<String, OriginError> {
        let Some(journal) = self.journal.clone() else {
            return Err(OriginError::Empty);
        };

        let record = tokio::task::spawn_blocking(move || {
            let mut reader = journal
                .lock()
                .map_err(|_| OriginError::Parse("journal reader poisoned".to_string()))?;
            reader.read()
        })
        .await
        .map_err(|e| OriginError::Parse(format!("journal task failed: {}", e)))??;

        record_to_payload(&record)
    }

    async fn read_url(&self, url: &str) -> Result<String, OriginError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(OriginError::HttpStatus(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}
