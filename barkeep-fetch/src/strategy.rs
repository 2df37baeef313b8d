//! Strategy tiers.
//!
//! A tier is a labelled, ordered group of transports. It stops at the
//! first sub-transport that succeeds.
//!
//! - Standard: `[Direct]`
//! - Edge-optimized: `[Browser, MinimalHeaders, Xhr]`

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use barkeep_core::{FailureKind, StrategyUsed};
use tracing::{debug, instrument};

use crate::context::FetchSettings;
use crate::error::FetchError;
use crate::outcome::TransportOutcome;
use crate::request::RequestDescriptor;
use crate::transport::{
    BrowserTransport, DirectTransport, MinimalHeaderTransport, RandomAgent, Transport,
    TransportKind, UserAgentSource, XhrTransport,
};

// ============================================================================
// Attempt Record
// ============================================================================

/// Record of a single transport attempt.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    /// The transport ID that was attempted.
    pub transport_id: String,
    /// The kind of transport.
    pub kind: TransportKind,
    /// The tier the transport ran in.
    pub tier: StrategyUsed,
    /// HTTP status, if a response arrived.
    pub status_code: Option<u16>,
    /// Whether the attempt succeeded.
    pub success: bool,
    /// Classification if the attempt failed.
    pub failure: Option<FailureKind>,
    /// Error if the attempt failed.
    pub error: Option<String>,
    /// How long the attempt took.
    pub duration: Duration,
}

impl AttemptRecord {
    fn from_outcome(
        transport: &dyn Transport,
        tier: StrategyUsed,
        outcome: &TransportOutcome,
        duration: Duration,
    ) -> Self {
        let error = match outcome {
            TransportOutcome::Success { .. } => None,
            TransportOutcome::Failure {
                classification,
                message,
                ..
            } => Some(format!("{classification}: {message}")),
        };
        Self {
            transport_id: transport.id().to_string(),
            kind: transport.kind(),
            tier,
            status_code: outcome.status_code(),
            success: outcome.is_success(),
            failure: outcome.classification(),
            error,
            duration,
        }
    }
}

// ============================================================================
// Strategy Tier
// ============================================================================

/// A labelled, ordered list of transports.
#[derive(Clone)]
pub struct StrategyTier {
    strategy: StrategyUsed,
    transports: Vec<Arc<dyn Transport>>,
}

impl StrategyTier {
    /// Creates a tier from explicit transports.
    pub fn new(strategy: StrategyUsed, transports: Vec<Arc<dyn Transport>>) -> Self {
        Self {
            strategy,
            transports,
        }
    }

    /// The standard tier: a single direct transport.
    pub fn standard(settings: &FetchSettings) -> Result<Self, FetchError> {
        Ok(Self::new(
            StrategyUsed::Standard,
            vec![Arc::new(DirectTransport::new(settings)?)],
        ))
    }

    /// The edge-optimized tier with a random user agent per call.
    pub fn edge_optimized(settings: &FetchSettings) -> Result<Self, FetchError> {
        Self::edge_optimized_with_agents(settings, Box::new(RandomAgent))
    }

    /// The edge-optimized tier with a custom user-agent source.
    pub fn edge_optimized_with_agents(
        settings: &FetchSettings,
        agents: Box<dyn UserAgentSource>,
    ) -> Result<Self, FetchError> {
        Ok(Self::new(
            StrategyUsed::EdgeOptimized,
            vec![
                Arc::new(BrowserTransport::with_agent_source(settings, agents)?),
                Arc::new(MinimalHeaderTransport::new(settings)?),
                Arc::new(XhrTransport::new(settings)?),
            ],
        ))
    }

    /// The label reported when this tier succeeds.
    pub fn strategy(&self) -> StrategyUsed {
        self.strategy
    }

    /// Number of transports.
    pub fn len(&self) -> usize {
        self.transports.len()
    }

    /// Returns true if the tier has no transports.
    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    /// Runs the transports in order until one succeeds.
    ///
    /// Returns the last outcome: the success, or the final failure.
    #[instrument(skip(self, req, credential, attempts), fields(tier = %self.strategy))]
    pub async fn run(
        &self,
        req: &RequestDescriptor,
        credential: Option<&str>,
        attempts: &mut Vec<AttemptRecord>,
    ) -> TransportOutcome {
        let mut last = TransportOutcome::failure(
            FailureKind::Network,
            format!("No transports configured for {}", self.strategy),
        );

        for transport in &self.transports {
            let start = Instant::now();
            debug!(transport = %transport.id(), "Attempting transport");

            let outcome = transport.execute(req, credential).await;
            attempts.push(AttemptRecord::from_outcome(
                transport.as_ref(),
                self.strategy,
                &outcome,
                start.elapsed(),
            ));

            if outcome.is_success() {
                debug!(transport = %transport.id(), "Transport succeeded");
                return outcome;
            }

            debug!(
                transport = %transport.id(),
                kind = ?outcome.classification(),
                "Transport failed"
            );
            last = outcome;
        }

        last
    }
}

impl fmt::Debug for StrategyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.transports.iter().map(|t| t.id()).collect();
        f.debug_struct("StrategyTier")
            .field("strategy", &self.strategy)
            .field("transports", &ids)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use barkeep_core::FailureKind;
    use serde_json::json;

    struct Fixed {
        id: &'static str,
        outcome: TransportOutcome,
    }

    #[async_trait]
    impl Transport for Fixed {
        fn id(&self) -> &str {
            self.id
        }

        fn kind(&self) -> TransportKind {
            TransportKind::MinimalHeaders
        }

        async fn execute(&self, _req: &RequestDescriptor, _credential: Option<&str>) -> TransportOutcome {
            self.outcome.clone()
        }
    }

    fn fixed(id: &'static str, outcome: TransportOutcome) -> Arc<dyn Transport> {
        Arc::new(Fixed { id, outcome })
    }

    #[test]
    fn test_builtin_tier_order() {
        let settings = FetchSettings::default();
        let standard = StrategyTier::standard(&settings).unwrap();
        assert_eq!(standard.strategy(), StrategyUsed::Standard);
        assert_eq!(format!("{standard:?}").matches("standard.direct").count(), 1);

        let edge = StrategyTier::edge_optimized(&settings).unwrap();
        assert_eq!(edge.len(), 3);
        let debug = format!("{edge:?}");
        let browser = debug.find("edge.browser").unwrap();
        let minimal = debug.find("edge.minimal").unwrap();
        let xhr = debug.find("edge.xhr").unwrap();
        assert!(browser < minimal && minimal < xhr);
    }

    #[tokio::test]
    async fn test_tier_stops_at_first_success() {
        let tier = StrategyTier::new(
            StrategyUsed::EdgeOptimized,
            vec![
                fixed("a", TransportOutcome::failure(FailureKind::BotProtection, "challenge")),
                fixed("b", TransportOutcome::json(200, json!({"ok": true}))),
                fixed("c", TransportOutcome::failure(FailureKind::Network, "unreachable")),
            ],
        );

        let mut attempts = Vec::new();
        let outcome = tier.run(&RequestDescriptor::get("/health"), None, &mut attempts).await;

        assert!(outcome.is_success());
        assert_eq!(attempts.len(), 2);
        assert!(!attempts[0].success);
        assert_eq!(attempts[1].transport_id, "b");
    }

    #[tokio::test]
    async fn test_tier_returns_last_failure() {
        let tier = StrategyTier::new(
            StrategyUsed::EdgeOptimized,
            vec![
                fixed("a", TransportOutcome::failure(FailureKind::BotProtection, "challenge")),
                fixed("b", TransportOutcome::failure(FailureKind::Timeout, "slow")),
            ],
        );

        let mut attempts = Vec::new();
        let outcome = tier.run(&RequestDescriptor::get("/health"), None, &mut attempts).await;
        assert_eq!(outcome.classification(), Some(FailureKind::Timeout));
        assert_eq!(attempts.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_tier_fails() {
        let tier = StrategyTier::new(StrategyUsed::Standard, Vec::new());
        let mut attempts = Vec::new();
        let outcome = tier.run(&RequestDescriptor::get("/health"), None, &mut attempts).await;
        assert!(!outcome.is_success());
        assert!(attempts.is_empty());
    }
}
