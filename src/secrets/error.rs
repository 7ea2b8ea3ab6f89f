// Shopline CLI — Secure store error types

use thiserror::Error;

/// What a raw backend (keyring, file, mock) reports for a single call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("entry not found")]
    NotFound,

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("timed out opening keyring")]
    TimedOut,

    #[error("{0}")]
    Failure(String),
}

/// Errors surfaced by [`SecretStore`](super::SecretStore) operations.
#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("failed to open credential store: {0}")]
    Unavailable(String),

    #[error("credentials not found: {0}")]
    NotFound(String),

    #[error("failed to unmarshal credentials for {name}: {source}")]
    Corrupt {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to marshal credentials: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to list profiles: {0}")]
    List(String),

    #[error("failed to remove profile {name}: {reason}")]
    Remove { name: String, reason: String },
}

impl SecretsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SecretsError::NotFound(_))
    }
}
