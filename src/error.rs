//! Error types for each concern of the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from listing and normalizing repository items.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("repository identifier is empty")]
    EmptyRepository,

    #[error("request to item source failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("item source returned invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("record {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },
}

/// Errors from a generation backend. The generation client turns every one of
/// these into fallback text.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request to generation backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation backend responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("generation backend returned an empty result")]
    EmptyResult,

    #[error("generation backend is not configured: {0}")]
    NotConfigured(String),
}

/// Errors from the key-value persistence substrate.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode value for `{key}`: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors returned by dashboard actions.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Repository(#[from] FetchError),

    #[error("no item with key {0}")]
    UnknownItem(String),

    #[error("item {0} already has a tweet")]
    AlreadyGenerated(String),

    #[error("item {0} has no tweet to publish")]
    NothingToPublish(String),

    #[error("failed to hand off share URL: {0}")]
    Share(#[source] std::io::Error),
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no data directory available; set MARKAI_DATA_DIR")]
    NoDataDir,
}

/// Errors from deriving a repository identifier from a local clone.
#[derive(Debug, Error)]
pub enum LocalRepoError {
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("remote `origin` has no URL")]
    NoOriginUrl,

    #[error("remote URL {0} does not point at a GitHub repository")]
    NotGitHub(String),
}
