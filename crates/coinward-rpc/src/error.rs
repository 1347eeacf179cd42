//! RPC error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP error calling {endpoint} at {url}: {source}")]
    Http {
        endpoint: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {endpoint} at {url}: {body}")]
    HttpStatus {
        endpoint: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("authentication failed for {url}")]
    AuthFailed { url: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("{0}")]
    Other(String),
}

impl RpcError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            RpcError::Http { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            RpcError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
