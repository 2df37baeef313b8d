//! Orchestrator tests with scripted transports.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use barkeep_core::{FailureKind, StrategyUsed, UnifiedResult};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::context::FetchContext;
use crate::credential::MemoryTokenStore;
use crate::error::FetchError;
use crate::orchestrator::{OfflineFallback, Orchestrator};
use crate::outcome::TransportOutcome;
use crate::request::RequestDescriptor;
use crate::strategy::StrategyTier;
use crate::transport::{Transport, TransportKind};

// ============================================================================
// Scripted Transport
// ============================================================================

/// Plays back outcomes in order; repeats the last one when exhausted.
struct Scripted {
    id: &'static str,
    outcomes: Mutex<VecDeque<TransportOutcome>>,
    last: Mutex<Option<TransportOutcome>>,
    calls: AtomicUsize,
    saw_credential: Mutex<Vec<Option<String>>>,
}

impl Scripted {
    fn new(id: &'static str, outcomes: Vec<TransportOutcome>) -> Arc<Self> {
        Arc::new(Self {
            id,
            outcomes: Mutex::new(outcomes.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
            saw_credential: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for Scripted {
    fn id(&self) -> &str {
        self.id
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Direct
    }

    async fn execute(&self, _req: &RequestDescriptor, credential: Option<&str>) -> TransportOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.saw_credential
            .lock()
            .unwrap()
            .push(credential.map(str::to_string));

        let next = self.outcomes.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(outcome) = next {
            *last = Some(outcome.clone());
            outcome
        } else {
            last.clone()
                .unwrap_or_else(|| TransportOutcome::failure(FailureKind::Network, "script empty"))
        }
    }
}

struct StaticFallback;

impl OfflineFallback for StaticFallback {
    fn answer(&self, req: &RequestDescriptor) -> Option<Value> {
        (req.path() == "/categories").then(|| {
            json!([
                {"id": 1, "name": "Cocktails", "slug": "cocktails"},
                {"id": 2, "name": "Mocktails", "slug": "mocktails"},
                {"id": 3, "name": "Longdrinks", "slug": "longdrinks"},
                {"id": 4, "name": "Shots", "slug": "shots"},
                {"id": 5, "name": "Softdrinks", "slug": "softdrinks"}
            ])
        })
    }
}

#[derive(Debug, Deserialize)]
struct Cat {
    slug: String,
}

fn ok(body: Value) -> TransportOutcome {
    TransportOutcome::json(200, body)
}

fn fail(kind: FailureKind) -> TransportOutcome {
    TransportOutcome::failure(kind, format!("{kind} failure"))
}

struct Harness {
    orchestrator: Orchestrator,
    direct: Arc<Scripted>,
    edge: Vec<Arc<Scripted>>,
}

fn harness(ctx: FetchContext, direct: Vec<TransportOutcome>, edge: Vec<Vec<TransportOutcome>>) -> Harness {
    let direct_t = Scripted::new("standard.direct", direct);
    let edge_t: Vec<Arc<Scripted>> = edge
        .into_iter()
        .zip(["edge.browser", "edge.minimal", "edge.xhr"])
        .map(|(outcomes, id)| Scripted::new(id, outcomes))
        .collect();

    let standard = StrategyTier::new(
        StrategyUsed::Standard,
        vec![direct_t.clone() as Arc<dyn Transport>],
    );
    let edge_tier = StrategyTier::new(
        StrategyUsed::EdgeOptimized,
        edge_t.iter().map(|t| t.clone() as Arc<dyn Transport>).collect(),
    );

    Harness {
        orchestrator: Orchestrator::with_tiers(Arc::new(ctx), standard, edge_tier),
        direct: direct_t,
        edge: edge_t,
    }
}

fn quick_ctx() -> FetchContext {
    FetchContext::builder()
        .base_url("http://localhost:3000/api")
        .rate_limit_backoff(Duration::from_millis(10))
        .build()
}

fn all_fail(kind: FailureKind) -> Vec<Vec<TransportOutcome>> {
    vec![vec![fail(kind)], vec![fail(kind)], vec![fail(kind)]]
}

// ============================================================================
// Ordering and Retry Count
// ============================================================================

#[tokio::test]
async fn test_first_success_has_zero_retries() {
    let h = harness(quick_ctx(), vec![ok(json!({"status": "ok"}))], all_fail(FailureKind::Network));

    let result: UnifiedResult<Value> = h.orchestrator.fetch_json(&RequestDescriptor::get("/health")).await;

    assert!(result.is_success());
    assert_eq!(result.strategy_used(), Some(StrategyUsed::Standard));
    assert_eq!(result.retry_count(), 0);
    assert!(h.edge.iter().all(|t| t.calls() == 0));
}

#[tokio::test]
async fn test_edge_success_after_standard_failure() {
    let h = harness(
        quick_ctx(),
        vec![fail(FailureKind::BotProtection)],
        vec![vec![fail(FailureKind::BotProtection)], vec![ok(json!({"status": "ok"}))], vec![]],
    );

    let orchestration = h.orchestrator.execute(&RequestDescriptor::get("/health")).await;

    assert!(orchestration.is_success());
    assert_eq!(orchestration.strategy_used(), Some(StrategyUsed::EdgeOptimized));
    assert_eq!(orchestration.retry_count, 1);
    assert_eq!(orchestration.attempts.len(), 3);
    assert_eq!(h.edge[2].calls(), 0);
    // BotProtection does not teach the edge preference.
    assert!(!h.orchestrator.policy().prefer_edge());
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_backoff_observed() {
    let ctx = FetchContext::builder()
        .rate_limit_backoff(Duration::from_secs(2))
        .build();
    let h = harness(
        ctx,
        vec![fail(FailureKind::RateLimit)],
        vec![vec![ok(json!({"status": "ok"}))]],
    );

    let started = tokio::time::Instant::now();
    let result: UnifiedResult<Value> = h.orchestrator.fetch_json(&RequestDescriptor::get("/health")).await;

    assert!(result.is_success());
    assert_eq!(result.retry_count(), 1);
    assert!(started.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_no_backoff_without_next_tier() {
    let ctx = FetchContext::builder()
        .rate_limit_backoff(Duration::from_secs(2))
        .build();
    ctx.policy.set_fallback_enabled(false);
    let h = harness(ctx, vec![fail(FailureKind::RateLimit)], all_fail(FailureKind::Network));

    let started = tokio::time::Instant::now();
    let orchestration = h.orchestrator.execute(&RequestDescriptor::get("/health")).await;

    assert!(!orchestration.is_success());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_all_tiers_fail() {
    let h = harness(quick_ctx(), vec![fail(FailureKind::EdgeError)], all_fail(FailureKind::Timeout));

    let orchestration = h.orchestrator.execute(&RequestDescriptor::get("/drinks")).await;

    assert_eq!(orchestration.retry_count, 2);
    assert_eq!(orchestration.attempts.len(), 4);
    assert_eq!(orchestration.errors().len(), 4);
    match &orchestration.result {
        Err(FetchError::AllStrategiesFailed { kind, .. }) => assert_eq!(*kind, FailureKind::Timeout),
        other => panic!("expected exhaustion, got {other:?}"),
    }

    let result = orchestration.into_unified::<Value>();
    assert!(!result.is_success());
    assert!(!result.error().unwrap().is_empty());
    assert_eq!(result.failure_kind(), Some(FailureKind::Timeout));
}

#[tokio::test]
async fn test_fallback_disabled_stops_after_first_tier() {
    let ctx = quick_ctx();
    ctx.policy.set_fallback_enabled(false);
    let h = harness(ctx, vec![fail(FailureKind::HttpError)], vec![vec![ok(json!({}))]]);

    let orchestration = h.orchestrator.execute(&RequestDescriptor::get("/drinks")).await;

    assert_eq!(orchestration.retry_count, 1);
    assert_eq!(h.edge[0].calls(), 0);
    assert!(matches!(
        orchestration.result,
        Err(FetchError::Transport { kind: FailureKind::HttpError, .. })
    ));
}

#[tokio::test]
async fn test_max_retries_zero_never_switches() {
    let ctx = quick_ctx();
    ctx.policy.set_max_retries(0);
    let h = harness(ctx, vec![fail(FailureKind::EdgeError)], vec![vec![ok(json!({}))]]);

    let orchestration = h.orchestrator.execute(&RequestDescriptor::get("/drinks")).await;

    assert!(!orchestration.is_success());
    assert_eq!(h.edge[0].calls(), 0);
}

// ============================================================================
// Sticky Preference
// ============================================================================

#[tokio::test]
async fn test_cors_flips_preference_for_next_call() {
    let h = harness(
        quick_ctx(),
        vec![fail(FailureKind::Cors), ok(json!({}))],
        vec![vec![ok(json!({"status": "ok"}))]],
    );
    assert!(!h.orchestrator.policy().prefer_edge());

    let first = h.orchestrator.execute(&RequestDescriptor::get("/health")).await;
    assert_eq!(first.strategy_used(), Some(StrategyUsed::EdgeOptimized));
    assert!(h.orchestrator.policy().prefer_edge());

    let second = h.orchestrator.execute(&RequestDescriptor::get("/health")).await;
    assert_eq!(second.attempts[0].tier, StrategyUsed::EdgeOptimized);
    assert_eq!(second.strategy_used(), Some(StrategyUsed::EdgeOptimized));
    assert_eq!(second.retry_count, 0);
    assert_eq!(h.direct.calls(), 1);
}

#[tokio::test]
async fn test_network_failure_sets_preference() {
    let h = harness(quick_ctx(), vec![fail(FailureKind::Network)], all_fail(FailureKind::Network));
    let _ = h.orchestrator.execute(&RequestDescriptor::get("/health")).await;
    assert!(h.orchestrator.policy().prefer_edge());
}

#[tokio::test]
async fn test_cors_inside_edge_tier_sets_preference() {
    let h = harness(
        quick_ctx(),
        vec![fail(FailureKind::HttpError)],
        vec![
            vec![fail(FailureKind::Cors)],
            vec![fail(FailureKind::HttpError)],
            vec![fail(FailureKind::HttpError)],
        ],
    );

    let orchestration = h.orchestrator.execute(&RequestDescriptor::get("/drinks")).await;

    assert!(!orchestration.is_success());
    assert_eq!(orchestration.attempts[1].failure, Some(FailureKind::Cors));
    assert!(h.orchestrator.policy().prefer_edge());
}

#[tokio::test]
async fn test_plain_http_errors_keep_standard_first() {
    let h = harness(quick_ctx(), vec![fail(FailureKind::HttpError)], all_fail(FailureKind::HttpError));
    let _ = h.orchestrator.execute(&RequestDescriptor::get("/drinks")).await;
    assert!(!h.orchestrator.policy().prefer_edge());
}

// ============================================================================
// Credentials
// ============================================================================

#[tokio::test]
async fn test_auth_required_without_token_fails_fast() {
    let h = harness(quick_ctx(), vec![ok(json!({}))], vec![vec![ok(json!({}))]]);
    let req = RequestDescriptor::delete("/drinks/3").authenticated();

    let orchestration = h.orchestrator.execute(&req).await;

    assert!(matches!(orchestration.result, Err(FetchError::Configuration(_))));
    assert!(orchestration.attempts.is_empty());
    assert_eq!(h.direct.calls(), 0);
}

#[tokio::test]
async fn test_expired_token_counts_as_missing() {
    use base64::prelude::*;
    let payload = BASE64_URL_SAFE_NO_PAD.encode(br#"{"exp":1000}"#);
    let ctx = FetchContext::builder()
        .token_store(Arc::new(MemoryTokenStore::with_token(format!("h.{payload}.s"))))
        .build();
    assert!(!ctx.credentials.is_authenticated().await);

    let h = harness(ctx, vec![ok(json!({}))], vec![vec![ok(json!({}))]]);

    // Public request goes out without a credential.
    let public = h.orchestrator.execute(&RequestDescriptor::get("/drinks")).await;
    assert!(public.is_success());
    assert_eq!(h.direct.saw_credential.lock().unwrap()[0], None);

    // Protected request fails fast.
    let protected = h
        .orchestrator
        .execute(&RequestDescriptor::post("/drinks").authenticated())
        .await;
    assert!(matches!(protected.result, Err(FetchError::Configuration(_))));
}

#[tokio::test]
async fn test_fallback_token_is_sent() {
    let ctx = FetchContext::builder()
        .fallback_token(Some("service-token".to_string()))
        .build();
    let h = harness(ctx, vec![ok(json!({}))], vec![]);

    let orchestration = h
        .orchestrator
        .execute(&RequestDescriptor::post("/drinks").authenticated())
        .await;
    assert!(orchestration.is_success());
    assert_eq!(
        h.direct.saw_credential.lock().unwrap()[0].as_deref(),
        Some("service-token")
    );
}

// ============================================================================
// Offline Fallback
// ============================================================================

#[tokio::test]
async fn test_offline_answer_after_exhaustion() {
    let h = harness(quick_ctx(), vec![fail(FailureKind::Network)], all_fail(FailureKind::Network));
    let orchestrator = h.orchestrator.with_offline(Arc::new(StaticFallback));

    let result: UnifiedResult<Vec<Cat>> = orchestrator
        .fetch_json_with_fallback(&RequestDescriptor::get("/categories"))
        .await;

    assert!(result.is_success());
    assert!(result.is_mock());
    assert_eq!(result.retry_count(), 2);
    let cats = result.into_data().unwrap();
    assert_eq!(cats.len(), 5);
    assert_eq!(cats[0].slug, "cocktails");
}

#[tokio::test]
async fn test_offline_not_consulted_on_success() {
    let h = harness(
        quick_ctx(),
        vec![ok(json!([{"id": 9, "name": "Live", "slug": "live"}]))],
        vec![],
    );
    let orchestrator = h.orchestrator.with_offline(Arc::new(StaticFallback));

    let result: UnifiedResult<Vec<Cat>> = orchestrator
        .fetch_json_with_fallback(&RequestDescriptor::get("/categories"))
        .await;

    assert_eq!(result.strategy_used(), Some(StrategyUsed::Standard));
    assert_eq!(result.into_data().unwrap()[0].slug, "live");
}

#[tokio::test]
async fn test_offline_not_consulted_on_configuration_error() {
    let h = harness(quick_ctx(), vec![], vec![]);
    let orchestrator = h.orchestrator.with_offline(Arc::new(StaticFallback));

    let result: UnifiedResult<Vec<Cat>> = orchestrator
        .fetch_json_with_fallback(&RequestDescriptor::get("/categories").authenticated())
        .await;

    assert!(!result.is_success());
    assert!(!result.is_mock());
    assert_eq!(result.failure_kind(), Some(FailureKind::Configuration));
}

#[tokio::test]
async fn test_offline_without_answer_returns_failure() {
    let h = harness(quick_ctx(), vec![fail(FailureKind::Network)], all_fail(FailureKind::Network));
    let orchestrator = h.orchestrator.with_offline(Arc::new(StaticFallback));

    let result: UnifiedResult<Value> = orchestrator
        .fetch_json_with_fallback(&RequestDescriptor::get("/auth/me"))
        .await;

    assert!(!result.is_success());
    assert_eq!(result.failure_kind(), Some(FailureKind::Network));
}

#[tokio::test]
async fn test_decode_mismatch_is_failure() {
    let h = harness(quick_ctx(), vec![ok(json!({"unexpected": true}))], vec![]);
    let result: UnifiedResult<Vec<Cat>> = h
        .orchestrator
        .fetch_json(&RequestDescriptor::get("/categories"))
        .await;
    assert!(!result.is_success());
    assert_eq!(result.retry_count(), 0);
}
