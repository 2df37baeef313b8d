//! Strategy orchestrator.
//!
//! Runs a logical request through the strategy tiers in order, learning
//! the sticky edge preference along the way:
//!
//! 1. Fail fast if the request needs a credential and none is available.
//! 2. Order tiers `[Standard, EdgeOptimized]`, reversed when the policy
//!    prefers the edge.
//! 3. Return the first success. On failure, count the switch, back off
//!    after a rate limit, and flip the edge preference on `Cors`/`Network`.
//! 4. When every selected tier failed, report exhaustion. Only then may the
//!    offline fallback answer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use barkeep_core::{FailureKind, StrategyUsed, UnifiedResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::context::FetchContext;
use crate::error::FetchError;
use crate::outcome::{HeaderSnapshot, ResponseBody, TransportOutcome, decode_payload};
use crate::policy::OrchestrationPolicy;
use crate::request::RequestDescriptor;
use crate::strategy::{AttemptRecord, StrategyTier};

// ============================================================================
// Offline Fallback
// ============================================================================

/// Answers requests from local data after live strategies are exhausted.
pub trait OfflineFallback: Send + Sync {
    /// Returns the JSON answer for `req`, or `None` if there is none.
    fn answer(&self, req: &RequestDescriptor) -> Option<Value>;
}

// ============================================================================
// Orchestration
// ============================================================================

/// A successful live response.
#[derive(Debug, Clone)]
pub struct OrchestratedResponse {
    /// Tier that produced the response.
    pub strategy: StrategyUsed,
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers.
    pub headers: HeaderSnapshot,
    /// Response body.
    pub body: ResponseBody,
}

/// The outcome of one orchestrated call.
#[derive(Debug)]
pub struct Orchestration {
    /// The response or the final error.
    pub result: Result<OrchestratedResponse, FetchError>,
    /// All transport attempts made.
    pub attempts: Vec<AttemptRecord>,
    /// Failed tiers before the result.
    pub retry_count: u32,
    /// Total duration, backoff included.
    pub duration: Duration,
    /// Edge ray id of the last response that carried one.
    pub diagnostic_id: Option<String>,
}

impl Orchestration {
    fn failed(error: FetchError, start: Instant) -> Self {
        Self {
            result: Err(error),
            attempts: Vec::new(),
            retry_count: 0,
            duration: start.elapsed(),
            diagnostic_id: None,
        }
    }

    /// Returns true if a live tier succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The tier that succeeded, if any.
    pub fn strategy_used(&self) -> Option<StrategyUsed> {
        self.result.as_ref().ok().map(|r| r.strategy)
    }

    /// Returns all errors that occurred.
    pub fn errors(&self) -> Vec<&str> {
        self.attempts
            .iter()
            .filter_map(|a| a.error.as_deref())
            .collect()
    }

    /// Converts into a [`UnifiedResult`], decoding the body as `T`.
    pub fn into_unified<T: DeserializeOwned>(self) -> UnifiedResult<T> {
        let retry_count = self.retry_count;
        let diagnostic_id = self.diagnostic_id;

        match self.result {
            Ok(response) => match response.body.decode::<T>() {
                Ok(data) => UnifiedResult::ok(data, response.strategy, retry_count)
                    .with_diagnostic_id(diagnostic_id),
                Err(e) => {
                    warn!(error = %e, "Response payload did not match the expected shape");
                    UnifiedResult::failure(e.user_message(), retry_count)
                        .with_diagnostic_id(diagnostic_id)
                }
            },
            Err(e) => {
                let result = UnifiedResult::failure(e.user_message(), retry_count)
                    .with_diagnostic_id(diagnostic_id);
                match e.failure_kind() {
                    Some(kind) => result.with_failure_kind(kind),
                    None => result,
                }
            }
        }
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Sequences strategy tiers for each logical request.
pub struct Orchestrator {
    ctx: Arc<FetchContext>,
    standard: StrategyTier,
    edge: StrategyTier,
    offline: Option<Arc<dyn OfflineFallback>>,
}

impl Orchestrator {
    /// Creates an orchestrator with the built-in tiers.
    pub fn new(ctx: Arc<FetchContext>) -> Result<Self, FetchError> {
        let standard = StrategyTier::standard(&ctx.settings)?;
        let edge = StrategyTier::edge_optimized(&ctx.settings)?;
        Ok(Self::with_tiers(ctx, standard, edge))
    }

    /// Creates an orchestrator with custom tiers.
    pub fn with_tiers(ctx: Arc<FetchContext>, standard: StrategyTier, edge: StrategyTier) -> Self {
        Self {
            ctx,
            standard,
            edge,
            offline: None,
        }
    }

    /// Attaches an offline fallback, consulted only after exhaustion.
    pub fn with_offline(mut self, offline: Arc<dyn OfflineFallback>) -> Self {
        self.offline = Some(offline);
        self
    }

    /// Removes the offline fallback.
    pub fn without_offline(mut self) -> Self {
        self.offline = None;
        self
    }

    /// Returns true if an offline fallback is attached.
    pub fn has_offline(&self) -> bool {
        self.offline.is_some()
    }

    /// The shared fetch context.
    pub fn context(&self) -> &Arc<FetchContext> {
        &self.ctx
    }

    /// The shared routing policy.
    pub fn policy(&self) -> &Arc<OrchestrationPolicy> {
        &self.ctx.policy
    }

    /// The tier labelled `strategy`. `Mock` has no tier.
    pub fn tier(&self, strategy: StrategyUsed) -> Option<&StrategyTier> {
        match strategy {
            StrategyUsed::Standard => Some(&self.standard),
            StrategyUsed::EdgeOptimized => Some(&self.edge),
            StrategyUsed::Mock => None,
        }
    }

    /// Runs the request through the tiers.
    #[instrument(skip(self, req), fields(method = %req.method(), path = %req.path()))]
    pub async fn execute(&self, req: &RequestDescriptor) -> Orchestration {
        let start = Instant::now();

        let credential = self.ctx.credentials.get().await;
        if req.requires_auth() && credential.is_none() {
            warn!("Request requires a credential but none is configured");
            return Orchestration::failed(
                FetchError::Configuration(
                    "Authentication required: log in or configure a service token.".to_string(),
                ),
                start,
            );
        }

        if let Err(e) = req.url(self.ctx.base_url()) {
            warn!(error = %e, "Cannot build request URL");
            return Orchestration::failed(e, start);
        }

        let policy = &self.ctx.policy;
        let order: [&StrategyTier; 2] = if policy.prefer_edge() {
            [&self.edge, &self.standard]
        } else {
            [&self.standard, &self.edge]
        };
        let fallback_enabled = policy.fallback_enabled();
        let max_switches = policy.max_retries();

        debug!(
            first = %order[0].strategy(),
            fallback_enabled,
            max_switches,
            "Executing orchestrated request"
        );

        let mut attempts = Vec::new();
        let mut retry_count = 0u32;
        let mut diagnostic_id = None;
        let mut tiers_run = 0usize;
        let mut last_failure = (FailureKind::Network, None, String::from("No strategy attempted"));

        for (index, tier) in order.iter().enumerate() {
            tiers_run += 1;
            let tier_start = attempts.len();
            let outcome = tier.run(req, credential.as_deref(), &mut attempts).await;
            if let Some(id) = outcome.diagnostic_id() {
                diagnostic_id = Some(id);
            }

            match outcome {
                TransportOutcome::Success {
                    status_code,
                    headers,
                    body,
                } => {
                    info!(
                        strategy = %tier.strategy(),
                        retry_count,
                        status = status_code,
                        "Request succeeded"
                    );
                    return Orchestration {
                        result: Ok(OrchestratedResponse {
                            strategy: tier.strategy(),
                            status_code,
                            headers,
                            body,
                        }),
                        attempts,
                        retry_count,
                        duration: start.elapsed(),
                        diagnostic_id,
                    };
                }
                TransportOutcome::Failure {
                    classification,
                    status_code,
                    message,
                    ..
                } => {
                    retry_count += 1;
                    warn!(
                        strategy = %tier.strategy(),
                        kind = %classification,
                        status = ?status_code,
                        error = %message,
                        "Strategy tier failed"
                    );

                    // Any transport of the tier may carry the edge hint, not just the last.
                    let edge_hint = attempts[tier_start..]
                        .iter()
                        .filter_map(|a| a.failure)
                        .any(|k| k.suggests_edge());
                    if edge_hint {
                        policy.set_prefer_edge(true);
                    }
                    last_failure = (classification, status_code, message);

                    let next = index + 1;
                    let can_switch = fallback_enabled
                        && next < order.len()
                        && u32::try_from(next).is_ok_and(|n| n <= max_switches);
                    if !can_switch {
                        break;
                    }

                    if classification == FailureKind::RateLimit {
                        let backoff = self.ctx.settings.rate_limit_backoff;
                        debug!(backoff_ms = backoff.as_millis(), "Rate limited, backing off");
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }

        let (kind, status, message) = last_failure;
        let error = if tiers_run > 1 {
            FetchError::AllStrategiesFailed { kind, message }
        } else {
            FetchError::Transport {
                kind,
                status,
                message,
            }
        };
        warn!(retry_count, error = %error, "Request exhausted all strategies");

        Orchestration {
            result: Err(error),
            attempts,
            retry_count,
            duration: start.elapsed(),
            diagnostic_id,
        }
    }

    /// Runs the request and decodes the payload as `T`.
    pub async fn fetch_json<T: DeserializeOwned>(&self, req: &RequestDescriptor) -> UnifiedResult<T> {
        self.execute(req).await.into_unified()
    }

    /// Like [`fetch_json`](Self::fetch_json), answering from the offline
    /// fallback when every live tier failed.
    ///
    /// Substituted answers report [`StrategyUsed::Mock`] and keep the live
    /// retry count.
    pub async fn fetch_json_with_fallback<T: DeserializeOwned>(
        &self,
        req: &RequestDescriptor,
    ) -> UnifiedResult<T> {
        let orchestration = self.execute(req).await;

        let exhausted = matches!(&orchestration.result, Err(e) if e.is_exhaustion());
        if exhausted {
            if let Some(answer) = self.offline.as_ref().and_then(|o| o.answer(req)) {
                match decode_payload::<T>(answer) {
                    Ok(data) => {
                        info!(
                            path = %req.path(),
                            retry_count = orchestration.retry_count,
                            "Serving offline data"
                        );
                        return UnifiedResult::ok(data, StrategyUsed::Mock, orchestration.retry_count)
                            .with_diagnostic_id(orchestration.diagnostic_id);
                    }
                    Err(e) => warn!(error = %e, "Offline answer did not match the expected shape"),
                }
            } else {
                debug!(path = %req.path(), "No offline answer");
            }
        }

        orchestration.into_unified()
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("standard", &self.standard)
            .field("edge", &self.edge)
            .field("offline", &self.offline.is_some())
            .finish_non_exhaustive()
    }
}
