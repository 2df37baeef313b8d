//! The uniform result contract and the failure taxonomy.
//!
//! - [`UnifiedResult`] - What every logical operation hands back to the UI
//! - [`StrategyUsed`] - Which tier produced the payload
//! - [`FailureKind`] - Classified transport failure

use serde::{Deserialize, Serialize};

// ============================================================================
// Strategy Used
// ============================================================================

/// The strategy tier that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyUsed {
    /// Direct request with standard JSON headers.
    #[default]
    Standard,
    /// One of the edge-proxy workarounds (browser headers, minimal headers, XHR).
    EdgeOptimized,
    /// The offline dataset.
    Mock,
}

impl StrategyUsed {
    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::EdgeOptimized => "Edge-optimized",
            Self::Mock => "Offline data",
        }
    }

    /// Returns true if the payload came from a live backend.
    pub fn is_live(&self) -> bool {
        !matches!(self, Self::Mock)
    }
}

impl std::fmt::Display for StrategyUsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Failure Kind
// ============================================================================

/// Classification of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// DNS, connection refused, reset, TLS.
    Network,
    /// Cross-origin rejection, usually injected by the edge proxy.
    Cors,
    /// The edge proxy served a bot challenge page.
    BotProtection,
    /// 429 or 503.
    RateLimit,
    /// Edge proxy 520-527 range.
    EdgeError,
    /// Any other non-2xx status.
    HttpError,
    /// The client-side timeout fired.
    Timeout,
    /// Missing credential or setting; no transport ran.
    Configuration,
}

impl FailureKind {
    /// Returns a short label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Cors => "cors",
            Self::BotProtection => "bot-protection",
            Self::RateLimit => "rate-limit",
            Self::EdgeError => "edge-error",
            Self::HttpError => "http-error",
            Self::Timeout => "timeout",
            Self::Configuration => "configuration",
        }
    }

    /// Returns a message suitable for end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network => "The service is unreachable. Check your connection.",
            Self::Cors => "The service refused the request from this origin.",
            Self::BotProtection => "The request was blocked by the service's bot protection.",
            Self::RateLimit => "Service temporarily rate-limited, retrying shortly.",
            Self::EdgeError => "The service's edge network could not reach the backend.",
            Self::HttpError => "The service returned an error.",
            Self::Timeout => "The service took too long to respond.",
            Self::Configuration => "The client is missing a credential or setting.",
        }
    }

    /// Returns true if switching to the edge-optimized tier may help.
    pub fn suggests_edge(&self) -> bool {
        matches!(self, Self::Cors | Self::Network)
    }

    /// Returns all kinds.
    pub fn all() -> &'static [FailureKind] {
        &[
            Self::Network,
            Self::Cors,
            Self::BotProtection,
            Self::RateLimit,
            Self::EdgeError,
            Self::HttpError,
            Self::Timeout,
            Self::Configuration,
        ]
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Unified Result
// ============================================================================

/// The contract every logical operation returns to callers.
///
/// `success == true` implies `data` is present and `error` is absent.
/// `success == false` implies `error` is present and non-empty. The
/// fields are private so only the constructors can build one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedResult<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    strategy_used: Option<StrategyUsed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostic_id: Option<String>,
    retry_count: u32,
}

impl<T> UnifiedResult<T> {
    /// Creates a successful result.
    pub fn ok(data: T, strategy: StrategyUsed, retry_count: u32) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            failure_kind: None,
            strategy_used: Some(strategy),
            diagnostic_id: None,
            retry_count,
        }
    }

    /// Creates a failed result.
    ///
    /// An empty message is replaced with a generic one.
    pub fn failure(error: impl Into<String>, retry_count: u32) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "Request failed".to_string();
        }
        Self {
            success: false,
            data: None,
            error: Some(error),
            failure_kind: None,
            strategy_used: None,
            diagnostic_id: None,
            retry_count,
        }
    }

    /// Attaches the classification of the final failure.
    pub fn with_failure_kind(mut self, kind: FailureKind) -> Self {
        if !self.success {
            self.failure_kind = Some(kind);
        }
        self
    }

    /// Attaches a diagnostic identifier (edge ray id).
    pub fn with_diagnostic_id(mut self, id: Option<String>) -> Self {
        self.diagnostic_id = id;
        self
    }

    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The payload, if successful.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Consumes the result, returning the payload.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// The error message, if failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Classification of the final failure.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure_kind
    }

    /// The tier that produced the payload.
    pub fn strategy_used(&self) -> Option<StrategyUsed> {
        self.strategy_used
    }

    /// The edge ray id seen on the final response.
    pub fn diagnostic_id(&self) -> Option<&str> {
        self.diagnostic_id.as_deref()
    }

    /// Number of tier switches made.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Returns true if the payload came from the offline dataset.
    pub fn is_mock(&self) -> bool {
        self.strategy_used == Some(StrategyUsed::Mock)
    }

    /// Maps the payload, preserving metadata.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> UnifiedResult<U> {
        UnifiedResult {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            failure_kind: self.failure_kind,
            strategy_used: self.strategy_used,
            diagnostic_id: self.diagnostic_id,
            retry_count: self.retry_count,
        }
    }

    /// Converts into a standard `Result`.
    pub fn into_result(self) -> Result<T, String> {
        match (self.data, self.error) {
            (Some(data), None) => Ok(data),
            (_, Some(error)) => Err(error),
            (None, None) => Err("Request failed".to_string()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
