//! Normalized result of one transport attempt.

use std::collections::BTreeMap;

use barkeep_core::FailureKind;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::classify;
use crate::error::FetchError;

/// Response headers with lowercased names.
pub type HeaderSnapshot = BTreeMap<String, String>;

/// Copies a reqwest header map into a [`HeaderSnapshot`].
///
/// Non-UTF-8 values are skipped. Repeated headers are joined with `, `.
pub fn snapshot_headers(headers: &reqwest::header::HeaderMap) -> HeaderSnapshot {
    let mut snapshot = HeaderSnapshot::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        snapshot
            .entry(name.as_str().to_ascii_lowercase())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    snapshot
}

// ============================================================================
// Response Body
// ============================================================================

/// Body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Parsed JSON (content type indicated JSON).
    Json(Value),
    /// Raw text for any other content type.
    Text(String),
    /// No body (e.g. 204).
    Empty,
}

impl ResponseBody {
    /// Converts the body into a JSON value.
    ///
    /// Text becomes a JSON string and an empty body becomes `null`.
    pub fn into_value(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
            Self::Empty => Value::Null,
        }
    }

    /// Decodes the payload into `T`.
    ///
    /// Bodies wrapped in a `{"data": ...}` envelope are unwrapped when the
    /// body itself does not match `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, FetchError> {
        decode_payload(self.into_value())
    }
}

/// Decodes a JSON value into `T`, unwrapping a `data` envelope if needed.
pub fn decode_payload<T: DeserializeOwned>(value: Value) -> Result<T, FetchError> {
    match serde_json::from_value::<T>(value.clone()) {
        Ok(decoded) => Ok(decoded),
        Err(err) => match value {
            Value::Object(mut map) if map.contains_key("data") => {
                let inner = map.remove("data").unwrap_or(Value::Null);
                Ok(serde_json::from_value(inner)?)
            }
            _ => Err(err.into()),
        },
    }
}

// ============================================================================
// Transport Outcome
// ============================================================================

/// Result of one strategy attempt. Exactly one variant is live.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportOutcome {
    /// 2xx response.
    Success {
        /// HTTP status code.
        status_code: u16,
        /// Response headers.
        headers: HeaderSnapshot,
        /// Response body.
        body: ResponseBody,
    },
    /// Anything else, classified.
    Failure {
        /// Failure classification.
        classification: FailureKind,
        /// HTTP status, when a response arrived.
        status_code: Option<u16>,
        /// Diagnostic message.
        message: String,
        /// Headers of the failed response, when one arrived.
        origin_headers: Option<HeaderSnapshot>,
    },
}

impl TransportOutcome {
    /// Creates a failure without a response.
    pub fn failure(classification: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            classification,
            status_code: None,
            message: message.into(),
            origin_headers: None,
        }
    }

    /// Creates a JSON success, mostly for tests and fallbacks.
    pub fn json(status_code: u16, body: Value) -> Self {
        Self::Success {
            status_code,
            headers: HeaderSnapshot::new(),
            body: ResponseBody::Json(body),
        }
    }

    /// Returns true for the success variant.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Failure classification, if failed.
    pub fn classification(&self) -> Option<FailureKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { classification, .. } => Some(*classification),
        }
    }

    /// HTTP status, if a response arrived.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Success { status_code, .. } => Some(*status_code),
            Self::Failure { status_code, .. } => *status_code,
        }
    }

    /// Failure message, if failed.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message, .. } => Some(message),
        }
    }

    /// Response headers, if a response arrived.
    pub fn headers(&self) -> Option<&HeaderSnapshot> {
        match self {
            Self::Success { headers, .. } => Some(headers),
            Self::Failure { origin_headers, .. } => origin_headers.as_ref(),
        }
    }

    /// The edge ray id, if the response carried one.
    pub fn diagnostic_id(&self) -> Option<String> {
        self.headers().and_then(classify::diagnostic_id)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    #[test]
    fn test_decode_plain_payload() {
        let body = ResponseBody::Json(json!({"id": 3}));
        assert_eq!(body.decode::<Item>().unwrap(), Item { id: 3 });
    }

    #[test]
    fn test_decode_data_envelope() {
        let body = ResponseBody::Json(json!({"success": true, "data": [{"id": 1}, {"id": 2}]}));
        let items: Vec<Item> = body.decode().unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_decode_mismatch_errors() {
        let body = ResponseBody::Text("<html>".to_string());
        assert!(body.decode::<Item>().is_err());
    }

    #[test]
    fn test_snapshot_headers_lowercases_and_joins() {
        let mut map = reqwest::header::HeaderMap::new();
        map.append("CF-Ray", "8a1b2c3d4e5f-FRA".parse().unwrap());
        map.append("vary", "origin".parse().unwrap());
        map.append("vary", "accept".parse().unwrap());

        let snapshot = snapshot_headers(&map);
        assert_eq!(snapshot.get("cf-ray").map(String::as_str), Some("8a1b2c3d4e5f-FRA"));
        assert_eq!(snapshot.get("vary").map(String::as_str), Some("origin, accept"));
    }

    #[test]
    fn test_outcome_accessors() {
        let mut headers = HeaderSnapshot::new();
        headers.insert("cf-ray".to_string(), "abc-AMS".to_string());
        let failure = TransportOutcome::Failure {
            classification: FailureKind::EdgeError,
            status_code: Some(522),
            message: "HTTP 522".to_string(),
            origin_headers: Some(headers),
        };
        assert!(!failure.is_success());
        assert_eq!(failure.classification(), Some(FailureKind::EdgeError));
        assert_eq!(failure.status_code(), Some(522));
        assert_eq!(failure.diagnostic_id().as_deref(), Some("abc-AMS"));

        let success = TransportOutcome::json(200, json!({}));
        assert!(success.classification().is_none());
        assert!(success.diagnostic_id().is_none());
    }
}
