//! Standard tier: a plain JSON request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{self, HeaderName};
use tracing::{debug, instrument};

use super::{JSON, Transport, TransportKind, USER_AGENT, build_headers, dispatch, prepare};
use crate::context::FetchSettings;
use crate::error::FetchError;
use crate::outcome::TransportOutcome;
use crate::request::RequestDescriptor;

/// Sends JSON content headers and the bearer credential.
///
/// The client has no cookie store. `Origin` is only sent when a site
/// origin is configured, which makes the request cross-origin.
#[derive(Debug, Clone)]
pub struct DirectTransport {
    client: Client,
    base_url: String,
    origin: Option<String>,
    timeout: Duration,
}

impl DirectTransport {
    /// Creates the transport from fetch settings.
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            origin: settings.site_origin.clone(),
            timeout: settings.timeout,
        })
    }

    fn default_headers(&self) -> Vec<(HeaderName, String)> {
        let mut headers = vec![
            (header::ACCEPT, JSON.to_string()),
            (header::CONTENT_TYPE, JSON.to_string()),
        ];
        if let Some(origin) = &self.origin {
            headers.push((header::ORIGIN, origin.clone()));
        }
        headers
    }
}

#[async_trait]
impl Transport for DirectTransport {
    fn id(&self) -> &str {
        "standard.direct"
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Direct
    }

    #[instrument(skip(self, req, credential), fields(method = %req.method(), path = %req.path()))]
    async fn execute(&self, req: &RequestDescriptor, credential: Option<&str>) -> TransportOutcome {
        let headers = build_headers(&self.default_headers(), credential, req.headers());
        let cross_origin = headers.contains_key(header::ORIGIN);

        let builder = match prepare(&self.client, req, &self.base_url, headers) {
            Ok(builder) => builder.timeout(self.timeout),
            Err(outcome) => return outcome,
        };

        debug!("Sending direct request");
        dispatch(builder, cross_origin).await
    }
}
