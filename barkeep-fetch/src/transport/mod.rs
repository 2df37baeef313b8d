//! Transport strategies.
//!
//! A transport is one concrete way of sending a [`RequestDescriptor`]:
//!
//! - [`DirectTransport`] - Plain JSON request (standard tier)
//! - [`BrowserTransport`] - Browser-like headers and user agent
//! - [`MinimalHeaderTransport`] - Only `Accept` and the credential
//! - [`XhrTransport`] - HTTP/1.1, unpooled, spawned with its own timer
//!
//! Transports never return errors. Every failure is classified and
//! reported as [`TransportOutcome::Failure`].

mod browser;
mod direct;
mod minimal;
mod xhr;


pub use browser::{BROWSER_USER_AGENTS, BrowserTransport, FixedAgent, RandomAgent, UserAgentSource};
pub use direct::DirectTransport;
pub use minimal::MinimalHeaderTransport;
pub use xhr::XhrTransport;

use std::fmt;

use async_trait::async_trait;
use barkeep_core::{FailureKind, StrategyUsed};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classify::{self, FailureContext};
use crate::outcome::{ResponseBody, TransportOutcome, snapshot_headers};
use crate::request::RequestDescriptor;

/// User agent of the non-browser transports.
pub(crate) const USER_AGENT: &str = concat!("Barkeep/", env!("CARGO_PKG_VERSION"));

/// JSON media type.
pub(crate) const JSON: &str = "application/json";

// ============================================================================
// Transport Kind
// ============================================================================

/// The kind of transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Standard JSON request.
    Direct,
    /// Only `Accept` and the credential header.
    MinimalHeaders,
    /// Browser-like headers.
    BrowserEmulation,
    /// XHR-style request on a dedicated client.
    Xhr,
}

impl TransportKind {
    /// Returns the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Direct => "Direct",
            Self::MinimalHeaders => "Minimal headers",
            Self::BrowserEmulation => "Browser emulation",
            Self::Xhr => "XHR",
        }
    }

    /// The tier this kind belongs to.
    pub fn tier(&self) -> StrategyUsed {
        match self {
            Self::Direct => StrategyUsed::Standard,
            Self::MinimalHeaders | Self::BrowserEmulation | Self::Xhr => StrategyUsed::EdgeOptimized,
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// One way of executing a request.
///
/// ```ignore
/// struct EchoTransport;
///
/// #[async_trait]
/// impl Transport for EchoTransport {
///     fn id(&self) -> &str {
///         "echo"
///     }
///
///     fn kind(&self) -> TransportKind {
///         TransportKind::Direct
///     }
///
///     async fn execute(&self, req: &RequestDescriptor, _: Option<&str>) -> TransportOutcome {
///         TransportOutcome::json(200, json!({ "path": req.path() }))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Unique identifier (e.g., "edge.browser").
    fn id(&self) -> &str;

    /// The kind of transport.
    fn kind(&self) -> TransportKind;

    /// Sends the request. `credential` is the bearer token, if any.
    async fn execute(&self, req: &RequestDescriptor, credential: Option<&str>) -> TransportOutcome;
}

// ============================================================================
// Shared Helpers
// ============================================================================

/// Builds the header map: transport defaults, then the credential, then
/// caller overrides. Later entries replace earlier ones.
pub(crate) fn build_headers(
    defaults: &[(HeaderName, String)],
    credential: Option<&str>,
    overrides: &[(String, String)],
) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (name, value) in defaults {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                headers.insert(name.clone(), value);
            }
            Err(_) => warn!(header = %name, "Skipping invalid header value"),
        }
    }

    if let Some(token) = credential {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(header::AUTHORIZATION, value);
            }
            Err(_) => warn!("Credential contains invalid header characters, not sent"),
        }
    }

    for (name, value) in overrides {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(header = %name, "Skipping invalid header override"),
        }
    }

    headers
}

/// Prepares a request builder with method, URL, headers and body.
///
/// Returns a failure outcome if the URL cannot be built.
pub(crate) fn prepare(
    client: &Client,
    req: &RequestDescriptor,
    base_url: &str,
    headers: HeaderMap,
) -> Result<RequestBuilder, TransportOutcome> {
    let url = req
        .url(base_url)
        .map_err(|e| TransportOutcome::failure(FailureKind::Network, e.to_string()))?;

    let mut builder = client
        .request(req.method().to_reqwest(), url)
        .headers(headers);
    if let Some(body) = req.body() {
        builder = builder.body(body.to_string());
    }
    Ok(builder)
}

/// Sends a prepared request and converts the result into an outcome.
pub(crate) async fn dispatch(builder: RequestBuilder, cross_origin: bool) -> TransportOutcome {
    match builder.send().await {
        Ok(response) => into_outcome(response, cross_origin).await,
        Err(e) => {
            let kind = classify::classify_reqwest_error(&e, cross_origin);
            let message = classify::error_chain_text(&e);
            debug!(kind = %kind, error = %message, "Request failed without a response");
            TransportOutcome::failure(kind, message)
        }
    }
}

/// Converts a response into an outcome.
///
/// 2xx bodies are parsed as JSON when the content type says JSON; a JSON
/// body that does not parse is an `HttpError`. Everything else is classified.
pub(crate) async fn into_outcome(response: Response, cross_origin: bool) -> TransportOutcome {
    let status = response.status();
    let headers = snapshot_headers(response.headers());
    let is_json = headers
        .get("content-type")
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));

    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            let kind = classify::classify_reqwest_error(&e, cross_origin);
            return TransportOutcome::Failure {
                classification: kind,
                status_code: Some(status.as_u16()),
                message: format!("Failed to read response body: {}", classify::error_chain_text(&e)),
                origin_headers: Some(headers),
            };
        }
    };

    if status.is_success() {
        let body = if text.trim().is_empty() {
            ResponseBody::Empty
        } else if is_json {
            match serde_json::from_str(&text) {
                Ok(value) => ResponseBody::Json(value),
                Err(e) => {
                    return TransportOutcome::Failure {
                        classification: FailureKind::HttpError,
                        status_code: Some(status.as_u16()),
                        message: format!("Invalid JSON body: {e}"),
                        origin_headers: Some(headers),
                    };
                }
            }
        } else {
            ResponseBody::Text(text)
        };

        return TransportOutcome::Success {
            status_code: status.as_u16(),
            headers,
            body,
        };
    }

    let ctx = FailureContext::for_status(status.as_u16(), &headers, &text).cross_origin(cross_origin);
    let classification = classify::classify(&ctx);
    debug!(
        status = status.as_u16(),
        kind = %classification,
        body_len = text.len(),
        "Non-success response"
    );

    let message = match status.canonical_reason() {
        Some(reason) => format!("HTTP {} {reason}", status.as_u16()),
        None => format!("HTTP {}", status.as_u16()),
    };

    TransportOutcome::Failure {
        classification,
        status_code: Some(status.as_u16()),
        message,
        origin_headers: Some(headers),
    }
}
