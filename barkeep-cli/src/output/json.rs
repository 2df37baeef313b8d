//! JSON output formatting.
//!
//! Results are printed as the serialized [`UnifiedResult`](barkeep_core::UnifiedResult)
//! so scripts see `success`, `strategyUsed`, `retryCount` and any
//! `failureKind` alongside the data.

use anyhow::Result;
use serde::Serialize;

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}
