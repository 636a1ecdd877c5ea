//! Error types for sketchbot-core
//!
//! Dispatch failures are already reported to the operator by the time they
//! reach a caller; they are returned so callers (and tests) can see the
//! outcome, not so they can be re-reported.

use thiserror::Error;

/// Failure of a single device call
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Network/HTTP layer failed or timed out
    #[error("transport failure: {0}")]
    Transport(#[from] sketchbot_device::Error),

    /// Call succeeded but the device reported a non-success outcome
    #[error("{kind}: {message}")]
    Semantic {
        /// Reported `type`
        kind: String,
        /// Reported message
        message: String,
    },
}

impl DispatchError {
    /// Create a semantic failure
    #[must_use]
    pub fn semantic(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Semantic {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Whether the network layer failed
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Action invoked outside its valid state
    #[error("not allowed: {0}")]
    GuardViolation(String),

    /// No position has been read from the device yet
    #[error("device position unknown; refresh before moving")]
    PositionUnknown,

    /// Device call failed
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Canvas failed (export, malformed stroke)
    #[error("canvas error: {0}")]
    Canvas(#[from] sketchbot_canvas::Error),
}

impl Error {
    /// Create a guard violation
    #[must_use]
    pub fn guard(msg: impl Into<String>) -> Self {
        Self::GuardViolation(msg.into())
    }

    /// Get a stable error code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::GuardViolation(_) => "guard_violation",
            Self::PositionUnknown => "position_unknown",
            Self::Dispatch(DispatchError::Transport(_)) => "transport_failure",
            Self::Dispatch(DispatchError::Semantic { .. }) => "semantic_failure",
            Self::Canvas(_) => "canvas_error",
        }
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::guard("no image").code(), "guard_violation");
        assert_eq!(Error::PositionUnknown.code(), "position_unknown");

        let err: Error = DispatchError::semantic("error", "device offline").into();
        assert_eq!(err.code(), "semantic_failure");

        let err: Error =
            DispatchError::from(sketchbot_device::Error::Timeout(100)).into();
        assert_eq!(err.code(), "transport_failure");
    }

    #[test]
    fn test_semantic_display() {
        let err = DispatchError::semantic("error", "device offline");
        assert_eq!(err.to_string(), "error: device offline");
        assert!(!err.is_transport());
    }
}
