use async_trait::async_trait;
use model::{MatrixRequest, MatrixResult};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum MatrixError {
    /// The response lacks `sources_to_targets` or its length does not match
    /// the request. Carries the raw response body.
    #[error("Malformed response: {response}")]
    MalformedResponse { response: String },
    #[error("Invalid response ({status}) {url}: {response}")]
    InvalidResponse {
        status: u16,
        url: String,
        response: String,
    },
    /// Connection failures and timeouts.
    #[error("transport error: {0}")]
    Transport(String),
    #[error("{0}")]
    Other(String),
}

impl MatrixError {
    /// Whether repeating the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// A routing service computing distance and time from one source to many
/// targets.
#[async_trait]
pub trait MatrixClient: Send + Sync + 'static {
    /// Returns one measurement per target, in target order. Implementations
    /// must fail with [`MatrixError::MalformedResponse`] rather than return a
    /// result of a different length.
    async fn sources_to_targets(
        &self,
        request: &MatrixRequest,
    ) -> Result<MatrixResult, MatrixError>;
}
