//! Edge tier: requests that look like they came from a browser tab.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::Client;
use reqwest::header::{self, HeaderName};
use tracing::{debug, instrument};

use super::{JSON, Transport, TransportKind, build_headers, dispatch, prepare};
use crate::context::FetchSettings;
use crate::error::FetchError;
use crate::outcome::TransportOutcome;
use crate::request::RequestDescriptor;

/// Pool of desktop and mobile browser user agents.
pub const BROWSER_USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Mobile Safari/537.36",
];

const ACCEPT_BROWSER: &str = "application/json, text/plain, */*";
const ACCEPT_LANGUAGE: &str = "de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7";
const ACCEPT_ENCODING: &str = "gzip, deflate, br";

// ============================================================================
// User Agent Source
// ============================================================================

/// Picks the user agent for each browser-emulating request.
pub trait UserAgentSource: Send + Sync + fmt::Debug {
    /// Returns the user agent for the next request.
    fn next_agent(&self) -> String;
}

/// Random pick from [`BROWSER_USER_AGENTS`] per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomAgent;

impl UserAgentSource for RandomAgent {
    fn next_agent(&self) -> String {
        BROWSER_USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(BROWSER_USER_AGENTS[0])
            .to_string()
    }
}

/// Always the same user agent.
#[derive(Debug, Clone)]
pub struct FixedAgent(pub String);

impl FixedAgent {
    /// Creates a fixed source.
    pub fn new(agent: impl Into<String>) -> Self {
        Self(agent.into())
    }
}

impl UserAgentSource for FixedAgent {
    fn next_agent(&self) -> String {
        self.0.clone()
    }
}

// ============================================================================
// Browser Transport
// ============================================================================

/// Browser-emulating transport.
#[derive(Debug)]
pub struct BrowserTransport {
    client: Client,
    base_url: String,
    origin: Option<String>,
    timeout: Duration,
    agents: Box<dyn UserAgentSource>,
}

impl BrowserTransport {
    /// Creates the transport with a random user agent per call.
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        Self::with_agent_source(settings, Box::new(RandomAgent))
    }

    /// Creates the transport with a custom user-agent source.
    pub fn with_agent_source(
        settings: &FetchSettings,
        agents: Box<dyn UserAgentSource>,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: settings.base_url.clone(),
            origin: settings.origin(),
            timeout: settings.timeout,
            agents,
        })
    }

    fn default_headers(&self, has_body: bool) -> Vec<(HeaderName, String)> {
        let mut headers = vec![
            (header::USER_AGENT, self.agents.next_agent()),
            (header::ACCEPT, ACCEPT_BROWSER.to_string()),
            (header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE.to_string()),
            (header::ACCEPT_ENCODING, ACCEPT_ENCODING.to_string()),
        ];
        if let Some(origin) = &self.origin {
            headers.push((header::REFERER, format!("{origin}/")));
            headers.push((header::ORIGIN, origin.clone()));
        }
        if has_body {
            headers.push((header::CONTENT_TYPE, JSON.to_string()));
        }
        headers
    }
}

#[async_trait]
impl Transport for BrowserTransport {
    fn id(&self) -> &str {
        "edge.browser"
    }

    fn kind(&self) -> TransportKind {
        TransportKind::BrowserEmulation
    }

    #[instrument(skip(self, req, credential), fields(method = %req.method(), path = %req.path()))]
    async fn execute(&self, req: &RequestDescriptor, credential: Option<&str>) -> TransportOutcome {
        let defaults = self.default_headers(req.body().is_some());
        let headers = build_headers(&defaults, credential, req.headers());
        let cross_origin = headers.contains_key(header::ORIGIN);

        let builder = match prepare(&self.client, req, &self.base_url, headers) {
            Ok(builder) => builder.timeout(self.timeout),
            Err(outcome) => return outcome,
        };

        debug!("Sending browser-emulating request");
        dispatch(builder, cross_origin).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_agent_from_pool() {
        let source = RandomAgent;
        for _ in 0..20 {
            let agent = source.next_agent();
            assert!(BROWSER_USER_AGENTS.contains(&agent.as_str()));
        }
    }

    #[test]
    fn test_fixed_agent() {
        let source = FixedAgent::new("TestAgent/1.0");
        assert_eq!(source.next_agent(), "TestAgent/1.0");
    }
}
