//! Error types for the storage layer.

use stockroom_core::DomainError;
use thiserror::Error;

/// Failure of the local durable cache.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local store unavailable: {0}")]
    Unavailable(String),
    #[error("local store query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("corrupt value under '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure talking to the remote table store.
///
/// These are logged by the gateway and never surface to its callers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("invalid remote credentials: {0}")]
    InvalidCredentials(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("remote error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(String),
}

/// Errors a gateway or session caller has to handle.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// User-facing: duplicate or empty names, unknown products, bad input.
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl GatewayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(DomainError::validation(msg))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, GatewayError::Validation(_))
    }
}
