use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Failed to read config file {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    #[error("Invalid config file: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Failed to build News API client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("News API request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("News API responded with {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Malformed News API payload: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to build storage client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Storage request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Storage responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Every way an ingestion run can fail. Display text is what callers show.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}
