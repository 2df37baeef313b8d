//! Backend health probing and strategy recommendation.
//!
//! A check probes the standard and edge tiers concurrently against the
//! probe path, then recommends a tier:
//!
//! 1. Direct succeeded -> `Standard`
//! 2. Else edge succeeded -> `EdgeOptimized`
//! 3. Else the previous recommendation (`Standard` at first)
//!
//! The recommendation is written into the shared policy so the next
//! orchestrated call benefits immediately.

use std::sync::Arc;
use std::time::{Duration, Instant};

use barkeep_core::{FailureKind, StrategyUsed};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::context::FetchContext;
use crate::error::FetchError;
use crate::request::RequestDescriptor;
use crate::strategy::StrategyTier;

/// Shortest interval accepted by [`HealthMonitor::spawn`].
const MIN_INTERVAL: Duration = Duration::from_secs(1);

// ============================================================================
// Reports
// ============================================================================

/// Result of probing one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    /// The probed tier.
    pub strategy: StrategyUsed,
    /// Whether any transport in the tier succeeded.
    pub success: bool,
    /// HTTP status of the final attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Classification, if failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Failure message, if failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Probe latency in milliseconds.
    pub latency_ms: u64,
}

/// Result of one health check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    /// Standard tier probe.
    pub direct: ProbeReport,
    /// Edge tier probe.
    pub edge: ProbeReport,
    /// Recommended tier.
    pub recommended: StrategyUsed,
    /// When the check ran.
    pub checked_at: DateTime<Utc>,
}

impl HealthSnapshot {
    /// Returns true if either tier reached the backend.
    pub fn is_online(&self) -> bool {
        self.direct.success || self.edge.success
    }
}

/// Applies the recommendation rule.
pub fn recommend(direct_ok: bool, edge_ok: bool, previous: Option<StrategyUsed>) -> StrategyUsed {
    if direct_ok {
        StrategyUsed::Standard
    } else if edge_ok {
        StrategyUsed::EdgeOptimized
    } else {
        previous.unwrap_or(StrategyUsed::Standard)
    }
}

// ============================================================================
// Health Monitor
// ============================================================================

/// Probes the backend and tracks the online flag.
pub struct HealthMonitor {
    ctx: Arc<FetchContext>,
    standard: StrategyTier,
    edge: StrategyTier,
    last: RwLock<Option<HealthSnapshot>>,
    online: watch::Sender<bool>,
}

impl HealthMonitor {
    /// Creates a monitor with the built-in tiers.
    pub fn new(ctx: Arc<FetchContext>) -> Result<Self, FetchError> {
        let standard = StrategyTier::standard(&ctx.settings)?;
        let edge = StrategyTier::edge_optimized(&ctx.settings)?;
        Ok(Self::with_tiers(ctx, standard, edge))
    }

    /// Creates a monitor with custom tiers.
    pub fn with_tiers(ctx: Arc<FetchContext>, standard: StrategyTier, edge: StrategyTier) -> Self {
        let (online, _) = watch::channel(true);
        Self {
            ctx,
            standard,
            edge,
            last: RwLock::new(None),
            online,
        }
    }

    /// Probes both tiers concurrently and records a new snapshot.
    #[instrument(skip(self))]
    pub async fn check(&self) -> HealthSnapshot {
        let req = RequestDescriptor::get(self.ctx.settings.probe_path.clone());
        let credential = self.ctx.credentials.get().await;

        let (direct, edge) = tokio::join!(
            probe(&self.standard, &req, credential.as_deref()),
            probe(&self.edge, &req, credential.as_deref()),
        );

        let mut last = self.last.write().await;
        let previous = last.as_ref().map(|s| s.recommended);
        let recommended = recommend(direct.success, edge.success, previous);

        let snapshot = HealthSnapshot {
            direct,
            edge,
            recommended,
            checked_at: Utc::now(),
        };
        *last = Some(snapshot.clone());
        drop(last);

        self.ctx
            .policy
            .set_prefer_edge(recommended == StrategyUsed::EdgeOptimized);
        self.publish(snapshot.is_online());

        debug!(
            direct = snapshot.direct.success,
            edge = snapshot.edge.success,
            recommended = %recommended,
            "Health check complete"
        );
        snapshot
    }

    fn publish(&self, online: bool) {
        let changed = self.online.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            if online {
                info!("Backend reachable again");
            } else {
                warn!("Backend unreachable through every strategy");
            }
        }
    }

    /// The latest snapshot, if a check has run.
    pub async fn last_snapshot(&self) -> Option<HealthSnapshot> {
        self.last.read().await.clone()
    }

    /// The current online flag. True until a check says otherwise.
    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    /// Subscribes to online/offline changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.online.subscribe()
    }

    /// Runs [`check`](Self::check) every `interval` in the background.
    ///
    /// The first check runs immediately. Abort the handle to stop.
    pub fn spawn(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        let interval = interval.max(MIN_INTERVAL);
        info!(interval_secs = interval.as_secs(), "Starting background health checks");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                monitor.check().await;
            }
        })
    }

    /// Runs background checks at the configured interval.
    pub fn spawn_default(self: &Arc<Self>) -> JoinHandle<()> {
        self.spawn(self.ctx.settings.health_interval)
    }
}

impl std::fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthMonitor")
            .field("online", &self.is_online())
            .finish_non_exhaustive()
    }
}

async fn probe(tier: &StrategyTier, req: &RequestDescriptor, credential: Option<&str>) -> ProbeReport {
    let start = Instant::now();
    let mut attempts = Vec::new();
    let outcome = tier.run(req, credential, &mut attempts).await;
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    ProbeReport {
        strategy: tier.strategy(),
        success: outcome.is_success(),
        status_code: outcome.status_code(),
        failure: outcome.classification(),
        message: outcome.message().map(str::to_string),
        latency_ms,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::outcome::TransportOutcome;
    use crate::transport::{Transport, TransportKind};

    /// Succeeds while `up` is set.
    struct Switch {
        up: AtomicBool,
        calls: AtomicUsize,
    }

    impl Switch {
        fn new(up: bool) -> Arc<Self> {
            Arc::new(Self {
                up: AtomicBool::new(up),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Transport for Switch {
        fn id(&self) -> &str {
            "switch"
        }

        fn kind(&self) -> TransportKind {
            TransportKind::Direct
        }

        async fn execute(&self, _req: &RequestDescriptor, _credential: Option<&str>) -> TransportOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.up.load(Ordering::SeqCst) {
                TransportOutcome::json(200, json!({"status": "ok"}))
            } else {
                TransportOutcome::failure(FailureKind::Network, "down")
            }
        }
    }

    fn monitor(direct: &Arc<Switch>, edge: &Arc<Switch>) -> HealthMonitor {
        let ctx = Arc::new(FetchContext::new());
        HealthMonitor::with_tiers(
            ctx,
            StrategyTier::new(StrategyUsed::Standard, vec![direct.clone() as Arc<dyn Transport>]),
            StrategyTier::new(StrategyUsed::EdgeOptimized, vec![edge.clone() as Arc<dyn Transport>]),
        )
    }

    #[test]
    fn test_recommend_rule() {
        assert_eq!(recommend(true, true, None), StrategyUsed::Standard);
        assert_eq!(recommend(true, false, Some(StrategyUsed::EdgeOptimized)), StrategyUsed::Standard);
        assert_eq!(recommend(false, true, None), StrategyUsed::EdgeOptimized);
        assert_eq!(recommend(false, false, None), StrategyUsed::Standard);
        assert_eq!(
            recommend(false, false, Some(StrategyUsed::EdgeOptimized)),
            StrategyUsed::EdgeOptimized
        );
    }

    #[tokio::test]
    async fn test_check_recommends_edge_and_sets_policy() {
        let direct = Switch::new(false);
        let edge = Switch::new(true);
        let monitor = monitor(&direct, &edge);

        let snapshot = monitor.check().await;
        assert_eq!(snapshot.recommended, StrategyUsed::EdgeOptimized);
        assert!(!snapshot.direct.success);
        assert_eq!(snapshot.direct.failure, Some(FailureKind::Network));
        assert!(snapshot.edge.success);
        assert!(monitor.ctx.policy.prefer_edge());

        direct.up.store(true, Ordering::SeqCst);
        let snapshot = monitor.check().await;
        assert_eq!(snapshot.recommended, StrategyUsed::Standard);
        assert!(!monitor.ctx.policy.prefer_edge());
    }

    #[tokio::test]
    async fn test_both_down_keeps_last_recommendation() {
        let direct = Switch::new(false);
        let edge = Switch::new(true);
        let monitor = monitor(&direct, &edge);

        monitor.check().await;
        edge.up.store(false, Ordering::SeqCst);
        let snapshot = monitor.check().await;

        assert_eq!(snapshot.recommended, StrategyUsed::EdgeOptimized);
        assert!(!snapshot.is_online());
        assert_eq!(monitor.last_snapshot().await, Some(snapshot));
    }

    #[tokio::test]
    async fn test_online_flag_transitions() {
        let direct = Switch::new(true);
        let edge = Switch::new(false);
        let monitor = monitor(&direct, &edge);
        let mut rx = monitor.subscribe();

        assert!(monitor.is_online());
        assert!(monitor.last_snapshot().await.is_none());

        direct.up.store(false, Ordering::SeqCst);
        monitor.check().await;
        assert!(!monitor.is_online());
        assert!(rx.has_changed().unwrap());
        assert!(!*rx.borrow_and_update());

        edge.up.store(true, Ordering::SeqCst);
        monitor.check().await;
        assert!(monitor.is_online());
        assert!(*rx.borrow_and_update());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_checks_periodically() {
        let direct = Switch::new(true);
        let edge = Switch::new(true);
        let monitor = Arc::new(monitor(&direct, &edge));

        let handle = monitor.spawn(Duration::from_secs(30));
        tokio::time::sleep(Duration::from_secs(65)).await;
        handle.abort();

        // Immediate tick plus two intervals.
        assert_eq!(direct.calls.load(Ordering::SeqCst), 3);
        assert!(monitor.last_snapshot().await.is_some());
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let report = ProbeReport {
            strategy: StrategyUsed::Standard,
            success: true,
            status_code: Some(200),
            failure: None,
            message: None,
            latency_ms: 12,
        };
        let snapshot = HealthSnapshot {
            direct: report.clone(),
            edge: report,
            recommended: StrategyUsed::Standard,
            checked_at: Utc::now(),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["direct"]["statusCode"], 200);
        assert_eq!(json["recommended"], "standard");
        assert!(json.get("checkedAt").is_some());
    }
}
