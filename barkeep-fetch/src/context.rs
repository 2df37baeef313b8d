//! Fetch context shared by transports, tiers and the orchestrator.
//!
//! The context bundles what every transport needs:
//! - Settings (base URL, timeouts, backoff, probe path)
//! - The credential provider
//! - The orchestration policy

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::credential::{CredentialProvider, MemoryTokenStore, TokenStore};
use crate::policy::OrchestrationPolicy;

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.barkeep.example/api";

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for fetch operations.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Backend base URL, including any path prefix.
    pub base_url: String,
    /// Site origin sent as `Origin`/`Referer` by browser-like transports.
    pub site_origin: Option<String>,
    /// Per-call timeout for the pooled transports.
    pub timeout: Duration,
    /// Client-side timeout for the XHR-style transport.
    pub xhr_timeout: Duration,
    /// Sleep after a rate-limited tier, before the next one.
    pub rate_limit_backoff: Duration,
    /// Interval of the background health check.
    pub health_interval: Duration,
    /// Path probed by the health monitor.
    pub probe_path: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            site_origin: None,
            timeout: Duration::from_secs(15),
            xhr_timeout: Duration::from_secs(12),
            rate_limit_backoff: Duration::from_secs(2),
            health_interval: Duration::from_secs(30),
            probe_path: "/health".to_string(),
        }
    }
}

impl FetchSettings {
    /// Creates settings for the given base URL.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Sets the transport timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the rate-limit backoff.
    pub fn with_rate_limit_backoff(mut self, backoff: Duration) -> Self {
        self.rate_limit_backoff = backoff;
        self
    }

    /// Origin used by browser-like transports: the configured site origin,
    /// else the scheme and host of the base URL.
    pub fn origin(&self) -> Option<String> {
        if let Some(origin) = &self.site_origin {
            return Some(origin.trim_end_matches('/').to_string());
        }
        let url = url::Url::parse(&self.base_url).ok()?;
        match url.origin() {
            url::Origin::Tuple(..) => Some(url.origin().ascii_serialization()),
            url::Origin::Opaque(_) => None,
        }
    }
}

// ============================================================================
// Fetch Context
// ============================================================================

/// Context handed to every transport.
pub struct FetchContext {
    /// Fetch settings.
    pub settings: FetchSettings,
    /// Bearer credential source.
    pub credentials: Arc<CredentialProvider>,
    /// Routing policy.
    pub policy: Arc<OrchestrationPolicy>,
}

impl FetchContext {
    /// Creates a context with default settings and an in-memory token store.
    pub fn new() -> Self {
        Self::with_settings(FetchSettings::default())
    }

    /// Creates a context with custom settings.
    pub fn with_settings(settings: FetchSettings) -> Self {
        Self::builder().settings(settings).build()
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> FetchContextBuilder {
        FetchContextBuilder::new()
    }

    /// Backend base URL.
    pub fn base_url(&self) -> &str {
        &self.settings.base_url
    }

    /// Transport timeout.
    pub fn timeout(&self) -> Duration {
        self.settings.timeout
    }
}

impl Default for FetchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("settings", &self.settings)
            .field("policy", &self.policy.snapshot())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fetch Context Builder
// ============================================================================

/// Builder for constructing a `FetchContext`.
pub struct FetchContextBuilder {
    settings: FetchSettings,
    token_store: Option<Arc<dyn TokenStore>>,
    fallback_token: Option<String>,
    credentials: Option<Arc<CredentialProvider>>,
    policy: Option<Arc<OrchestrationPolicy>>,
}

impl FetchContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            settings: FetchSettings::default(),
            token_store: None,
            fallback_token: None,
            credentials: None,
            policy: None,
        }
    }

    /// Sets the fetch settings.
    pub fn settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.settings.base_url = base_url.into();
        self
    }

    /// Sets the site origin.
    pub fn site_origin(mut self, origin: impl Into<String>) -> Self {
        self.settings.site_origin = Some(origin.into());
        self
    }

    /// Sets the transport timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Sets the XHR timeout.
    pub fn xhr_timeout(mut self, timeout: Duration) -> Self {
        self.settings.xhr_timeout = timeout;
        self
    }

    /// Sets the rate-limit backoff.
    pub fn rate_limit_backoff(mut self, backoff: Duration) -> Self {
        self.settings.rate_limit_backoff = backoff;
        self
    }

    /// Sets the persisted token store.
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Sets the static fallback token.
    pub fn fallback_token(mut self, token: Option<String>) -> Self {
        self.fallback_token = token;
        self
    }

    /// Uses an existing credential provider. Overrides the token settings.
    pub fn credentials(mut self, credentials: Arc<CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Shares an existing policy.
    pub fn policy(mut self, policy: Arc<OrchestrationPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Builds the fetch context.
    pub fn build(self) -> FetchContext {
        if self.settings.xhr_timeout.is_zero() || self.settings.timeout.is_zero() {
            warn!("Zero transport timeout configured; every request will time out");
        }

        let credentials = self.credentials.unwrap_or_else(|| {
            let store = self
                .token_store
                .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));
            Arc::new(CredentialProvider::new(store, self.fallback_token))
        });

        FetchContext {
            settings: self.settings,
            credentials,
            policy: self.policy.unwrap_or_default(),
        }
    }
}

impl Default for FetchContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = FetchSettings::default();
        assert_eq!(settings.timeout, Duration::from_secs(15));
        assert_eq!(settings.xhr_timeout, Duration::from_secs(12));
        assert_eq!(settings.rate_limit_backoff, Duration::from_secs(2));
        assert_eq!(settings.health_interval, Duration::from_secs(30));
        assert_eq!(settings.probe_path, "/health");
    }

    #[test]
    fn test_origin_from_base_url() {
        let settings = FetchSettings::for_base_url("https://api.barkeep.example/api");
        assert_eq!(settings.origin().as_deref(), Some("https://api.barkeep.example"));

        let mut settings = FetchSettings::for_base_url("http://127.0.0.1:8080/api");
        assert_eq!(settings.origin().as_deref(), Some("http://127.0.0.1:8080"));

        settings.site_origin = Some("https://www.barkeep.example/".to_string());
        assert_eq!(settings.origin().as_deref(), Some("https://www.barkeep.example"));
    }

    #[tokio::test]
    async fn test_context_builder() {
        let policy = Arc::new(OrchestrationPolicy::new());
        let ctx = FetchContext::builder()
            .base_url("http://localhost:3000/api")
            .timeout(Duration::from_secs(5))
            .fallback_token(Some("service-token".to_string()))
            .policy(policy.clone())
            .build();

        assert_eq!(ctx.base_url(), "http://localhost:3000/api");
        assert_eq!(ctx.timeout(), Duration::from_secs(5));
        assert_eq!(ctx.credentials.get().await.as_deref(), Some("service-token"));

        policy.set_prefer_edge(true);
        assert!(ctx.policy.prefer_edge());
    }
}
