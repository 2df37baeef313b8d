//! Fetch error types.

use barkeep_core::FailureKind;
use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for orchestrated fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Missing credential or configuration. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single tier failed and fallback was not allowed.
    #[error("Transport failed ({kind}): {message}")]
    Transport {
        /// Classification of the failure.
        kind: FailureKind,
        /// HTTP status, if a response was received.
        status: Option<u16>,
        /// Diagnostic message.
        message: String,
    },

    /// Every selected tier failed.
    #[error("All strategies failed, last error ({kind}): {message}")]
    AllStrategiesFailed {
        /// Classification of the last failure.
        kind: FailureKind,
        /// Diagnostic message of the last failure.
        message: String,
    },

    /// The payload did not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Credential layer error.
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),
}

impl FetchError {
    /// Classification of the failure, if it has one.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Transport { kind, .. } | Self::AllStrategiesFailed { kind, .. } => Some(*kind),
            Self::Configuration(_) => Some(FailureKind::Configuration),
            _ => None,
        }
    }

    /// Returns true if live strategies ran and none succeeded.
    ///
    /// Only these errors may be answered from the offline dataset.
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::AllStrategiesFailed { .. })
    }

    /// A short message suitable for end users.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { kind, .. } | Self::AllStrategiesFailed { kind, .. } => {
                kind.user_message().to_string()
            }
            Self::Configuration(msg) => msg.clone(),
            Self::Decode(_) => "The service returned an unexpected response.".to_string(),
            Self::InvalidUrl(_) | Self::Http(_) => "The client is misconfigured.".to_string(),
            Self::Credential(_) => "Stored credentials could not be accessed.".to_string(),
        }
    }
}

// ============================================================================
// Credential Error
// ============================================================================

/// Error type for credential operations.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Token does not have three dot-separated segments.
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Claims segment could not be decoded.
    #[error("Token decode error: {0}")]
    Decode(String),

    /// Persisted token store failed.
    #[error("Token store error: {0}")]
    Store(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_extraction() {
        let err = FetchError::AllStrategiesFailed {
            kind: FailureKind::RateLimit,
            message: "HTTP 429".to_string(),
        };
        assert_eq!(err.failure_kind(), Some(FailureKind::RateLimit));
        assert!(err.is_exhaustion());
        assert_eq!(err.user_message(), FailureKind::RateLimit.user_message());
    }

    #[test]
    fn test_configuration_not_exhaustion() {
        let err = FetchError::Configuration("no token".to_string());
        assert!(!err.is_exhaustion());
        assert_eq!(err.failure_kind(), Some(FailureKind::Configuration));
        assert_eq!(err.user_message(), "no token");
    }
}
