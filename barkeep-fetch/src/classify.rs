//! Failure classification.
//!
//! Checks run in a fixed order and the first match wins:
//!
//! 1. 429 or 503 -> [`FailureKind::RateLimit`]
//! 2. 520..=527 -> [`FailureKind::EdgeError`]
//! 3. 403 with a bot-challenge page -> [`FailureKind::BotProtection`]
//! 4. Edge ray header on a cross-origin failure without
//!    `access-control-allow-origin` -> [`FailureKind::Cors`]
//! 5. No HTTP status -> [`FailureKind::Timeout`], [`FailureKind::Cors`] or
//!    [`FailureKind::Network`] depending on the error
//! 6. Anything else -> [`FailureKind::HttpError`]

use barkeep_core::FailureKind;

use crate::outcome::HeaderSnapshot;

/// Header carrying the edge proxy's request identifier.
pub const EDGE_RAY_HEADER: &str = "cf-ray";

/// Header the backend sets on cross-origin responses.
pub const ALLOW_ORIGIN_HEADER: &str = "access-control-allow-origin";

/// Markers found in the edge proxy's challenge pages.
const CHALLENGE_MARKERS: &[&str] = &[
    "cf-chl",
    "cf_chl_opt",
    "challenge-platform",
    "just a moment",
    "attention required",
];

/// Markers of a cross-origin rejection in transport error text.
const CORS_ERROR_MARKERS: &[&str] = &["cors", "cross-origin", "access-control"];

// ============================================================================
// Failure Context
// ============================================================================

/// Everything the classifier looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureContext<'a> {
    /// HTTP status, if a response arrived.
    pub status: Option<u16>,
    /// Response headers, if a response arrived.
    pub headers: Option<&'a HeaderSnapshot>,
    /// Response body text.
    pub body: Option<&'a str>,
    /// Transport error text, when no response arrived.
    pub error_text: Option<&'a str>,
    /// The transport error was a timeout.
    pub timed_out: bool,
    /// The request carried an `Origin` header.
    pub cross_origin: bool,
}

impl<'a> FailureContext<'a> {
    /// Context for a non-2xx response.
    pub fn for_status(status: u16, headers: &'a HeaderSnapshot, body: &'a str) -> Self {
        Self {
            status: Some(status),
            headers: Some(headers),
            body: Some(body),
            ..Self::default()
        }
    }

    /// Context for a transport error without a response.
    pub fn for_error(error_text: &'a str, timed_out: bool) -> Self {
        Self {
            error_text: Some(error_text),
            timed_out,
            ..Self::default()
        }
    }

    /// Marks the request as cross-origin.
    pub fn cross_origin(mut self, cross_origin: bool) -> Self {
        self.cross_origin = cross_origin;
        self
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Classifies a failed attempt. Deterministic for a given context.
pub fn classify(ctx: &FailureContext<'_>) -> FailureKind {
    if let Some(status) = ctx.status {
        if status == 429 || status == 503 {
            return FailureKind::RateLimit;
        }
        if (520..=527).contains(&status) {
            return FailureKind::EdgeError;
        }
        if status == 403 && ctx.body.is_some_and(has_challenge_markers) {
            return FailureKind::BotProtection;
        }
    }

    if let Some(headers) = ctx.headers {
        if ctx.cross_origin
            && headers.contains_key(EDGE_RAY_HEADER)
            && !headers.contains_key(ALLOW_ORIGIN_HEADER)
        {
            return FailureKind::Cors;
        }
    }

    if ctx.status.is_none() {
        if ctx.timed_out {
            return FailureKind::Timeout;
        }
        if ctx.error_text.is_some_and(has_cors_markers) {
            return FailureKind::Cors;
        }
        return FailureKind::Network;
    }

    FailureKind::HttpError
}

/// Classifies a reqwest error that produced no response.
pub fn classify_reqwest_error(err: &reqwest::Error, cross_origin: bool) -> FailureKind {
    let text = error_chain_text(err);
    classify(&FailureContext::for_error(&text, err.is_timeout()).cross_origin(cross_origin))
}

/// Renders an error and its sources as one line.
pub fn error_chain_text(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Returns true if the response came through the edge proxy.
pub fn is_edge_branded(headers: &HeaderSnapshot) -> bool {
    headers.contains_key(EDGE_RAY_HEADER)
        || headers
            .get("server")
            .is_some_and(|s| s.to_ascii_lowercase().contains("cloudflare"))
}

/// The edge ray id, if present.
pub fn diagnostic_id(headers: &HeaderSnapshot) -> Option<String> {
    headers
        .get(EDGE_RAY_HEADER)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn has_challenge_markers(body: &str) -> bool {
    let body = body.to_ascii_lowercase();
    CHALLENGE_MARKERS.iter().any(|m| body.contains(m))
}

fn has_cors_markers(text: &str) -> bool {
    let text = text.to_ascii_lowercase();
    CORS_ERROR_MARKERS.iter().any(|m| text.contains(m))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_headers() -> HeaderSnapshot {
        let mut headers = HeaderSnapshot::new();
        headers.insert("cf-ray".to_string(), "8a1b2c3d4e5f-FRA".to_string());
        headers.insert("server".to_string(), "cloudflare".to_string());
        headers
    }

    #[test]
    fn test_rate_limit_regardless_of_headers() {
        let empty = HeaderSnapshot::new();
        let edge = edge_headers();
        for status in [429, 503] {
            assert_eq!(
                classify(&FailureContext::for_status(status, &empty, "")),
                FailureKind::RateLimit
            );
            assert_eq!(
                classify(&FailureContext::for_status(status, &edge, "just a moment").cross_origin(true)),
                FailureKind::RateLimit
            );
        }
    }

    #[test]
    fn test_edge_error_range() {
        let headers = HeaderSnapshot::new();
        for status in 520..=527 {
            assert_eq!(
                classify(&FailureContext::for_status(status, &headers, "")),
                FailureKind::EdgeError
            );
        }
        assert_eq!(
            classify(&FailureContext::for_status(519, &headers, "")),
            FailureKind::HttpError
        );
        assert_eq!(
            classify(&FailureContext::for_status(528, &headers, "")),
            FailureKind::HttpError
        );
    }

    #[test]
    fn test_bot_protection_needs_markers() {
        let headers = edge_headers();
        let page = "<html><title>Just a moment...</title><script src=\"/cdn-cgi/challenge-platform/h/b\"></script></html>";
        assert_eq!(
            classify(&FailureContext::for_status(403, &headers, page)),
            FailureKind::BotProtection
        );

        // Edge-branded 403 without markers falls through to HttpError.
        assert_eq!(
            classify(&FailureContext::for_status(403, &headers, "Forbidden")),
            FailureKind::HttpError
        );
    }

    #[test]
    fn test_bot_protection_wins_over_cors() {
        let headers = edge_headers();
        let ctx = FailureContext::for_status(403, &headers, "cf-chl-bypass").cross_origin(true);
        assert_eq!(classify(&ctx), FailureKind::BotProtection);
    }

    #[test]
    fn test_cors_from_edge_headers() {
        let headers = edge_headers();
        let ctx = FailureContext::for_status(403, &headers, "").cross_origin(true);
        assert_eq!(classify(&ctx), FailureKind::Cors);

        let mut allowed = edge_headers();
        allowed.insert(ALLOW_ORIGIN_HEADER.to_string(), "*".to_string());
        let ctx = FailureContext::for_status(403, &allowed, "").cross_origin(true);
        assert_eq!(classify(&ctx), FailureKind::HttpError);
    }

    #[test]
    fn test_same_origin_not_cors() {
        let headers = edge_headers();
        let ctx = FailureContext::for_status(404, &headers, "");
        assert_eq!(classify(&ctx), FailureKind::HttpError);
    }

    #[test]
    fn test_errors_without_status() {
        assert_eq!(
            classify(&FailureContext::for_error("error sending request: connection refused", false)),
            FailureKind::Network
        );
        assert_eq!(
            classify(&FailureContext::for_error("operation timed out", true)),
            FailureKind::Timeout
        );
        assert_eq!(
            classify(&FailureContext::for_error("CORS preflight did not succeed", false)),
            FailureKind::Cors
        );
    }

    #[test]
    fn test_classification_deterministic() {
        let headers = edge_headers();
        let ctx = FailureContext::for_status(500, &headers, "oops");
        let first = classify(&ctx);
        for _ in 0..10 {
            assert_eq!(classify(&ctx), first);
        }
    }

    #[test]
    fn test_edge_branding() {
        assert!(is_edge_branded(&edge_headers()));

        let mut server_only = HeaderSnapshot::new();
        server_only.insert("server".to_string(), "Cloudflare".to_string());
        assert!(is_edge_branded(&server_only));

        let mut nginx = HeaderSnapshot::new();
        nginx.insert("server".to_string(), "nginx".to_string());
        assert!(!is_edge_branded(&nginx));
    }

    #[test]
    fn test_diagnostic_id() {
        assert_eq!(
            diagnostic_id(&edge_headers()).as_deref(),
            Some("8a1b2c3d4e5f-FRA")
        );
        assert!(diagnostic_id(&HeaderSnapshot::new()).is_none());
    }
}
