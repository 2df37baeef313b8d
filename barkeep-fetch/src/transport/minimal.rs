//! Edge tier: bare request with only `Accept` and the credential.
//!
//! Some edge rules trip on content headers and origins. This variant
//! sends neither, and no user agent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header;
use tracing::{debug, instrument};

use super::{JSON, Transport, TransportKind, build_headers, dispatch, prepare};
use crate::context::FetchSettings;
use crate::error::FetchError;
use crate::outcome::TransportOutcome;
use crate::request::RequestDescriptor;

/// Minimal-header transport.
#[derive(Debug, Clone)]
pub struct MinimalHeaderTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl MinimalHeaderTransport {
    /// Creates the transport from fetch settings.
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: settings.base_url.clone(),
            timeout: settings.timeout,
        })
    }
}

#[async_trait]
impl Transport for MinimalHeaderTransport {
    fn id(&self) -> &str {
        "edge.minimal"
    }

    fn kind(&self) -> TransportKind {
        TransportKind::MinimalHeaders
    }

    #[instrument(skip(self, req, credential), fields(method = %req.method(), path = %req.path()))]
    async fn execute(&self, req: &RequestDescriptor, credential: Option<&str>) -> TransportOutcome {
        let headers = build_headers(&[(header::ACCEPT, JSON.to_string())], credential, &[]);

        let builder = match prepare(&self.client, req, &self.base_url, headers) {
            Ok(builder) => builder.timeout(self.timeout),
            Err(outcome) => return outcome,
        };

        debug!("Sending minimal-header request");
        dispatch(builder, false).await
    }
}
