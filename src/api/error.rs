use thiserror::Error;

/// Errors returned by the HTTP adapter and the resource modules built on it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS or timeout failure before a response arrived.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A required value (device, track uri, API key) was not available.
    #[error("Missing {0}")]
    Missing(&'static str),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
