//! Error types for sketchbot-device

use thiserror::Error;

/// Device transport error type
#[derive(Debug, Error)]
pub enum Error {
    /// Client could not be built from the configuration
    #[error("device not configured: {0}")]
    NotConfigured(String),

    /// Device answered with a non-success HTTP status
    #[error("api error: {0}")]
    Api(String),

    /// Response body could not be understood
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),
}

impl Error {
    /// Get a stable error code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "not_configured",
            Self::Api(_) => "api_error",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Network(_) => "network_error",
            Self::Timeout(_) => "timeout",
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::Timeout(1500).to_string(), "timeout after 1500ms");
        assert_eq!(Error::Api("HTTP 500".into()).code(), "api_error");
    }
}
