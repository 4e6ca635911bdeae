// Error types for the gateway core

use thiserror::Error;

use super::models::FormatSummary;

/// Discriminant of a [`GatewayError`], consumed by the dispatcher when it
/// picks a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    StreamingOnly,
    NoDirectUrl,
    Upstream,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing or malformed request parameter
    #[error("{0}")]
    Validation(String),

    /// Provider reports no media for the URL
    #[error("{0}")]
    NotFound(String),

    /// No format survives the direct-link filter
    #[error("No format of this media can be served as a single direct URL")]
    StreamingOnly { available: Vec<FormatSummary> },

    /// Chosen format carries no usable URL
    #[error("Format {0} has no direct URL")]
    NoDirectUrl(String),

    /// Provider failed during resolve or download
    #[error("{0}")]
    Upstream(String),

    /// Request parameter present but unusable
    #[error("{0}")]
    InvalidParameter(String),

    /// Provider output could not be decoded
    #[error("Failed to parse provider output: {0}")]
    Parse(String),

    /// Local process or filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::StreamingOnly { .. } => ErrorKind::StreamingOnly,
            Self::NoDirectUrl(_) => ErrorKind::NoDirectUrl,
            Self::Upstream(_) | Self::InvalidParameter(_) | Self::Parse(_) | Self::Io(_) => {
                ErrorKind::Upstream
            }
        }
    }

    pub fn missing_url() -> Self {
        Self::Validation("Missing 'url' parameter".to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
