// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Barkeep Fetch
//!
//! Resilient request execution against the Barkeep content backend.
//!
//! The backend sits behind an edge proxy that sometimes rejects, challenges
//! or rate-limits requests. This crate gets requests through anyway:
//!
//! ## Transports
//!
//! The [`transport`] module holds the concrete ways of sending a request:
//!
//! - [`transport::DirectTransport`] - Plain JSON request
//! - [`transport::BrowserTransport`] - Browser-like headers
//! - [`transport::MinimalHeaderTransport`] - Only `Accept` and the credential
//! - [`transport::XhrTransport`] - HTTP/1.1 on a spawned task with its own timer
//!
//! Failures are labelled by [`classify::classify`].
//!
//! ## Orchestration
//!
//! - [`strategy::StrategyTier`] - Ordered group of transports
//! - [`orchestrator::Orchestrator`] - Runs tiers in order, learns the edge bias
//! - [`policy::OrchestrationPolicy`] - Shared routing policy
//! - [`credential::CredentialProvider`] - Bearer token resolution
//! - [`health::HealthMonitor`] - Probes tiers and recommends one
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use barkeep_fetch::{FetchContext, Orchestrator, RequestDescriptor};
//!
//! let ctx = Arc::new(FetchContext::builder().base_url("https://api.barkeep.example/api").build());
//! let orchestrator = Orchestrator::new(ctx)?;
//!
//! let result = orchestrator
//!     .fetch_json::<serde_json::Value>(&RequestDescriptor::get("/health"))
//!     .await;
//! ```

// Core modules
pub mod classify;
pub mod context;
pub mod credential;
pub mod error;
pub mod health;
pub mod orchestrator;
pub mod outcome;
pub mod policy;
pub mod request;
pub mod strategy;
pub mod transport;

#[cfg(test)]
mod orchestrator_tests;

// Re-export key types at crate root

// Errors
pub use error::{CredentialError, FetchError};

// Requests & outcomes
pub use classify::{FailureContext, classify};
pub use outcome::{HeaderSnapshot, ResponseBody, TransportOutcome};
pub use request::{HttpMethod, RequestDescriptor};

// Transports & tiers
pub use strategy::{AttemptRecord, StrategyTier};
pub use transport::{
    BrowserTransport, DirectTransport, FixedAgent, MinimalHeaderTransport, RandomAgent, Transport,
    TransportKind, UserAgentSource, XhrTransport,
};

// Orchestration
pub use context::{FetchContext, FetchContextBuilder, FetchSettings};
pub use credential::{
    CredentialProvider, MemoryTokenStore, TokenClaims, TokenStore, decode_claims, is_token_expired,
};
pub use health::{HealthMonitor, HealthSnapshot, ProbeReport};
pub use orchestrator::{OfflineFallback, OrchestratedResponse, Orchestration, Orchestrator};
pub use policy::{OrchestrationPolicy, PolicySnapshot};
