//! Process-wide orchestration policy.
//!
//! Shared by the orchestrator and the health monitor through an `Arc`.
//! Fields only change through the setters below.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use serde::{Deserialize, Serialize};
use tracing::info;

/// Default cap on tier switches per call.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Mutable routing policy.
#[derive(Debug)]
pub struct OrchestrationPolicy {
    prefer_edge: AtomicBool,
    fallback_enabled: AtomicBool,
    max_retries: AtomicU32,
}

impl OrchestrationPolicy {
    /// Creates the default policy: standard tier first, fallback on, 3 switches.
    pub fn new() -> Self {
        Self {
            prefer_edge: AtomicBool::new(false),
            fallback_enabled: AtomicBool::new(true),
            max_retries: AtomicU32::new(DEFAULT_MAX_RETRIES),
        }
    }

    /// Creates a policy from a snapshot.
    pub fn from_snapshot(snapshot: PolicySnapshot) -> Self {
        Self {
            prefer_edge: AtomicBool::new(snapshot.prefer_edge),
            fallback_enabled: AtomicBool::new(snapshot.fallback_enabled),
            max_retries: AtomicU32::new(snapshot.max_retries),
        }
    }

    /// Whether the edge tier runs first.
    pub fn prefer_edge(&self) -> bool {
        self.prefer_edge.load(Ordering::SeqCst)
    }

    /// Sets the edge bias. Logs when the value flips.
    pub fn set_prefer_edge(&self, value: bool) {
        let previous = self.prefer_edge.swap(value, Ordering::SeqCst);
        if previous != value {
            info!(prefer_edge = value, "Routing preference changed");
        }
    }

    /// Whether later tiers run after the first one fails.
    pub fn fallback_enabled(&self) -> bool {
        self.fallback_enabled.load(Ordering::SeqCst)
    }

    /// Enables or disables tier fallback.
    pub fn set_fallback_enabled(&self, value: bool) {
        self.fallback_enabled.store(value, Ordering::SeqCst);
    }

    /// Maximum tier switches per call.
    pub fn max_retries(&self) -> u32 {
        self.max_retries.load(Ordering::SeqCst)
    }

    /// Sets the maximum tier switches per call.
    pub fn set_max_retries(&self, value: u32) {
        self.max_retries.store(value, Ordering::SeqCst);
    }

    /// Point-in-time copy of all fields.
    pub fn snapshot(&self) -> PolicySnapshot {
        PolicySnapshot {
            prefer_edge: self.prefer_edge(),
            fallback_enabled: self.fallback_enabled(),
            max_retries: self.max_retries(),
        }
    }
}

impl Default for OrchestrationPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable copy of an [`OrchestrationPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySnapshot {
    /// Edge tier runs first.
    pub prefer_edge: bool,
    /// Later tiers run after a failure.
    pub fallback_enabled: bool,
    /// Maximum tier switches per call.
    pub max_retries: u32,
}

impl Default for PolicySnapshot {
    fn default() -> Self {
        OrchestrationPolicy::new().snapshot()
    }
}
