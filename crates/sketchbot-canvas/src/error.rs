//! Error types for sketchbot-canvas

use thiserror::Error;

/// Canvas error type
#[derive(Debug, Error)]
pub enum Error {
    /// Stroke has no points or carries non-finite coordinates
    #[error("malformed stroke: {0}")]
    MalformedStroke(String),

    /// Vector export failed
    #[error("export error: {0}")]
    Export(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create a malformed stroke error
    #[must_use]
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedStroke(msg.into())
    }

    /// Get a stable error code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedStroke(_) => "malformed_stroke",
            Self::Export(_) => "export_error",
            Self::Serialization(_) => "serialization_error",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type alias for canvas operations
pub type Result<T> = std::result::Result<T, Error>;
