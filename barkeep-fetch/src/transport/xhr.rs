//! Edge tier: XHR-style request on its own HTTP/1.1 client.
//!
//! The request runs on a spawned task that reports back over a oneshot
//! channel. A client-side timer races the channel; when it wins, the task
//! is aborted and the attempt counts as a timeout.

use std::time::Duration;

use async_trait::async_trait;
use barkeep_core::FailureKind;
use reqwest::Client;
use reqwest::header::{self, HeaderName};
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use super::{JSON, Transport, TransportKind, USER_AGENT, build_headers, dispatch, prepare};
use crate::context::FetchSettings;
use crate::error::FetchError;
use crate::outcome::TransportOutcome;
use crate::request::RequestDescriptor;

/// XHR-style transport.
#[derive(Debug, Clone)]
pub struct XhrTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl XhrTransport {
    /// Creates the transport with its own HTTP/1.1 client and no idle pool.
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .http1_only()
            .pool_max_idle_per_host(0)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            timeout: settings.xhr_timeout,
        })
    }

    fn default_headers(has_body: bool) -> Vec<(HeaderName, String)> {
        let mut headers = vec![
            (header::ACCEPT, JSON.to_string()),
            (
                HeaderName::from_static("x-requested-with"),
                "XMLHttpRequest".to_string(),
            ),
        ];
        if has_body {
            headers.push((header::CONTENT_TYPE, JSON.to_string()));
        }
        headers
    }
}

#[async_trait]
impl Transport for XhrTransport {
    fn id(&self) -> &str {
        "edge.xhr"
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Xhr
    }

    #[instrument(skip(self, req, credential), fields(method = %req.method(), path = %req.path()))]
    async fn execute(&self, req: &RequestDescriptor, credential: Option<&str>) -> TransportOutcome {
        let headers = build_headers(&Self::default_headers(req.body().is_some()), credential, req.headers());
        let cross_origin = headers.contains_key(header::ORIGIN);

        let builder = match prepare(&self.client, req, &self.base_url, headers) {
            Ok(builder) => builder,
            Err(outcome) => return outcome,
        };

        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let outcome = dispatch(builder, cross_origin).await;
            // Receiver is gone after a timeout.
            let _ = tx.send(outcome);
        });

        debug!(timeout_ms = self.timeout.as_millis(), "Sending XHR request");
        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => {
                warn!("XHR task ended without reporting");
                TransportOutcome::failure(FailureKind::Network, "Request task ended without a result")
            }
            Err(_) => {
                task.abort();
                debug!("XHR request timed out, task aborted");
                TransportOutcome::failure(
                    FailureKind::Timeout,
                    format!("Request timed out after {} ms", self.timeout.as_millis()),
                )
            }
        }
    }
}
