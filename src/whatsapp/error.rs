//! Backend error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackendError>;

/// Failure talking to the WhatsApp connection backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection refused, DNS failure, timeout and the like.
    #[error("request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success HTTP status.
    #[error("backend returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The backend answered 2xx but the body was not what we expect.
    #[error("could not decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BackendError {
    /// Whether the request never produced a usable HTTP exchange.
    ///
    /// Decode errors are the only kind where the backend did answer.
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::Decode(_))
    }
}
