//! Bar content client.
//!
//! [`BarClient`] exposes one method per logical backend operation. Every
//! operation returns a [`UnifiedResult`]; nothing here panics or returns a
//! raw transport error.
//!
//! Reads go through the orchestrator with the offline dataset attached, so
//! they still answer when every live strategy fails. Writes and account
//! operations never fall back.

use std::sync::Arc;

use barkeep_core::{
    Category, CategoryUpdate, Drink, DrinkQuery, DrinkUpdate, HealthStatus, Highlight,
    HighlightUpdate, Location, LocationUpdate, LoginRequest, LoginResponse, NewCategory, NewDrink,
    NewHighlight, NewLocation, NewsletterRequest, NewsletterResponse, Paginated, SocialPost,
    UnifiedResult, User,
};
use barkeep_fetch::{
    CredentialError, CredentialProvider, FetchContext, FetchError, HealthMonitor, HealthSnapshot,
    OrchestrationPolicy, Orchestrator, PolicySnapshot, RequestDescriptor, TokenClaims, TokenStore,
};
use barkeep_store::{AppConfig, FileTokenStore, OfflineStore};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::endpoints;
use crate::error::ApiError;

// ============================================================================
// Bar Client
// ============================================================================

/// Client for the bar content backend.
pub struct BarClient {
    orchestrator: Orchestrator,
    monitor: Arc<HealthMonitor>,
}

impl BarClient {
    /// Creates a builder from resolved configuration.
    pub fn builder(config: AppConfig) -> BarClientBuilder {
        BarClientBuilder::new(config)
    }

    /// Creates a client from environment configuration with the default
    /// session file and the offline dataset.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::builder(AppConfig::from_env()?).build()
    }

    /// Assembles a client from prepared parts.
    pub fn from_parts(orchestrator: Orchestrator, monitor: Arc<HealthMonitor>) -> Self {
        Self {
            orchestrator,
            monitor,
        }
    }

    /// The underlying orchestrator.
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// The shared routing policy.
    pub fn policy(&self) -> &Arc<OrchestrationPolicy> {
        self.orchestrator.policy()
    }

    fn context(&self) -> &Arc<FetchContext> {
        self.orchestrator.context()
    }

    fn credentials(&self) -> &Arc<CredentialProvider> {
        &self.context().credentials
    }

    // ------------------------------------------------------------------------
    // Request helpers
    // ------------------------------------------------------------------------

    async fn read<T: DeserializeOwned>(&self, req: RequestDescriptor) -> UnifiedResult<T> {
        self.orchestrator.fetch_json_with_fallback(&req).await
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestDescriptor) -> UnifiedResult<T> {
        self.orchestrator.fetch_json(&req).await
    }

    async fn send_json<B, T>(&self, req: RequestDescriptor, body: &B) -> UnifiedResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match req.json_body(body) {
            Ok(req) => self.send(req).await,
            Err(e) => {
                warn!(error = %e, "Could not encode request body");
                UnifiedResult::failure(e.user_message(), 0)
            }
        }
    }

    async fn remove(&self, path: String) -> UnifiedResult<()> {
        self.send::<Value>(RequestDescriptor::delete(path).authenticated())
            .await
            .map(|_| ())
    }

    // ------------------------------------------------------------------------
    // Health
    // ------------------------------------------------------------------------

    /// Reads the backend health endpoint.
    #[instrument(skip(self))]
    pub async fn health(&self) -> UnifiedResult<HealthStatus> {
        self.read(RequestDescriptor::get(endpoints::HEALTH)).await
    }

    /// The background health monitor.
    pub fn health_monitor(&self) -> &Arc<HealthMonitor> {
        &self.monitor
    }

    /// Probes both tiers now and updates the routing preference.
    pub async fn check_health(&self) -> HealthSnapshot {
        self.monitor.check().await
    }

    /// Last known online state.
    pub fn is_online(&self) -> bool {
        self.monitor.is_online()
    }

    /// Starts periodic health checks at the configured interval.
    pub fn start_health_monitor(&self) -> JoinHandle<()> {
        self.monitor.spawn_default()
    }

    // ------------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------------

    /// Logs in and stores the returned token.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> UnifiedResult<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let result: UnifiedResult<LoginResponse> = self
            .send_json(RequestDescriptor::post(endpoints::AUTH_LOGIN), &body)
            .await;

        if let Some(response) = result.data() {
            if let Err(e) = self.credentials().set(&response.token).await {
                warn!(error = %e, "Could not store session token");
                return UnifiedResult::failure(
                    FetchError::from(e).user_message(),
                    result.retry_count(),
                );
            }
            info!(user_id = response.user.id, "Logged in");
        }
        result
    }

    /// Forgets the stored session token.
    pub async fn logout(&self) -> Result<(), CredentialError> {
        self.credentials().clear().await?;
        info!("Logged out");
        Ok(())
    }

    /// Returns true if a non-expired token is available.
    pub async fn is_authenticated(&self) -> bool {
        self.credentials().is_authenticated().await
    }

    /// Claims of the current session token.
    pub async fn session(&self) -> Option<TokenClaims> {
        self.credentials().session_claims().await
    }

    /// The user behind the current token.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> UnifiedResult<User> {
        self.send(RequestDescriptor::get(endpoints::AUTH_ME).authenticated())
            .await
    }

    // ------------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------------

    /// Lists all categories.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> UnifiedResult<Vec<Category>> {
        self.read(RequestDescriptor::get(endpoints::CATEGORIES)).await
    }

    /// Gets one category.
    #[instrument(skip(self))]
    pub async fn get_category(&self, id: u64) -> UnifiedResult<Category> {
        self.read(RequestDescriptor::get(endpoints::category(id))).await
    }

    /// Creates a category.
    #[instrument(skip(self, category), fields(slug = %category.slug))]
    pub async fn create_category(&self, category: &NewCategory) -> UnifiedResult<Category> {
        self.send_json(
            RequestDescriptor::post(endpoints::CATEGORIES).authenticated(),
            category,
        )
        .await
    }

    /// Updates a category.
    #[instrument(skip(self, update))]
    pub async fn update_category(&self, id: u64, update: &CategoryUpdate) -> UnifiedResult<Category> {
        self.send_json(
            RequestDescriptor::put(endpoints::category(id)).authenticated(),
            update,
        )
        .await
    }

    /// Deletes a category.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: u64) -> UnifiedResult<()> {
        self.remove(endpoints::category(id)).await
    }

    // ------------------------------------------------------------------------
    // Drinks
    // ------------------------------------------------------------------------

    /// Lists drinks matching `query`.
    #[instrument(skip(self, query), fields(q = ?query.q, category = ?query.category))]
    pub async fn list_drinks(&self, query: &DrinkQuery) -> UnifiedResult<Paginated<Drink>> {
        self.read(RequestDescriptor::get(endpoints::DRINKS).query(query.to_pairs()))
            .await
    }

    /// Free-text drink search, first page.
    pub async fn search_drinks(&self, text: &str) -> UnifiedResult<Paginated<Drink>> {
        self.list_drinks(&DrinkQuery::new().search(text)).await
    }

    /// Gets one drink.
    #[instrument(skip(self))]
    pub async fn get_drink(&self, id: u64) -> UnifiedResult<Drink> {
        self.read(RequestDescriptor::get(endpoints::drink(id))).await
    }

    /// Creates a drink.
    #[instrument(skip(self, drink), fields(name = %drink.name))]
    pub async fn create_drink(&self, drink: &NewDrink) -> UnifiedResult<Drink> {
        self.send_json(RequestDescriptor::post(endpoints::DRINKS).authenticated(), drink)
            .await
    }

    /// Updates a drink.
    #[instrument(skip(self, update))]
    pub async fn update_drink(&self, id: u64, update: &DrinkUpdate) -> UnifiedResult<Drink> {
        self.send_json(
            RequestDescriptor::put(endpoints::drink(id)).authenticated(),
            update,
        )
        .await
    }

    /// Deletes a drink.
    #[instrument(skip(self))]
    pub async fn delete_drink(&self, id: u64) -> UnifiedResult<()> {
        self.remove(endpoints::drink(id)).await
    }

    // ------------------------------------------------------------------------
    // Locations
    // ------------------------------------------------------------------------

    /// Lists all locations.
    #[instrument(skip(self))]
    pub async fn list_locations(&self) -> UnifiedResult<Vec<Location>> {
        self.read(RequestDescriptor::get(endpoints::LOCATIONS)).await
    }

    /// The location the bar is at right now, if any.
    #[instrument(skip(self))]
    pub async fn current_location(&self) -> UnifiedResult<Option<Location>> {
        self.read(RequestDescriptor::get(endpoints::LOCATIONS_CURRENT))
            .await
    }

    /// Upcoming locations, soonest first.
    #[instrument(skip(self))]
    pub async fn upcoming_locations(&self) -> UnifiedResult<Vec<Location>> {
        self.read(RequestDescriptor::get(endpoints::LOCATIONS_UPCOMING))
            .await
    }

    /// Gets one location.
    #[instrument(skip(self))]
    pub async fn get_location(&self, id: u64) -> UnifiedResult<Location> {
        self.read(RequestDescriptor::get(endpoints::location(id))).await
    }

    /// Creates a location.
    #[instrument(skip(self, location), fields(name = %location.name))]
    pub async fn create_location(&self, location: &NewLocation) -> UnifiedResult<Location> {
        self.send_json(
            RequestDescriptor::post(endpoints::LOCATIONS).authenticated(),
            location,
        )
        .await
    }

    /// Updates a location.
    #[instrument(skip(self, update))]
    pub async fn update_location(&self, id: u64, update: &LocationUpdate) -> UnifiedResult<Location> {
        self.send_json(
            RequestDescriptor::put(endpoints::location(id)).authenticated(),
            update,
        )
        .await
    }

    /// Deletes a location.
    #[instrument(skip(self))]
    pub async fn delete_location(&self, id: u64) -> UnifiedResult<()> {
        self.remove(endpoints::location(id)).await
    }

    // ------------------------------------------------------------------------
    // Highlights
    // ------------------------------------------------------------------------

    /// Lists all highlights.
    #[instrument(skip(self))]
    pub async fn list_highlights(&self) -> UnifiedResult<Vec<Highlight>> {
        self.read(RequestDescriptor::get(endpoints::HIGHLIGHTS)).await
    }

    /// Gets one highlight.
    #[instrument(skip(self))]
    pub async fn get_highlight(&self, id: u64) -> UnifiedResult<Highlight> {
        self.read(RequestDescriptor::get(endpoints::highlight(id))).await
    }

    /// Creates a highlight.
    #[instrument(skip(self, highlight), fields(title = %highlight.title))]
    pub async fn create_highlight(&self, highlight: &NewHighlight) -> UnifiedResult<Highlight> {
        self.send_json(
            RequestDescriptor::post(endpoints::HIGHLIGHTS).authenticated(),
            highlight,
        )
        .await
    }

    /// Updates a highlight.
    #[instrument(skip(self, update))]
    pub async fn update_highlight(
        &self,
        id: u64,
        update: &HighlightUpdate,
    ) -> UnifiedResult<Highlight> {
        self.send_json(
            RequestDescriptor::put(endpoints::highlight(id)).authenticated(),
            update,
        )
        .await
    }

    /// Deletes a highlight.
    #[instrument(skip(self))]
    pub async fn delete_highlight(&self, id: u64) -> UnifiedResult<()> {
        self.remove(endpoints::highlight(id)).await
    }

    // ------------------------------------------------------------------------
    // Newsletter & social
    // ------------------------------------------------------------------------

    /// Subscribes `email` to the newsletter.
    #[instrument(skip_all)]
    pub async fn subscribe_newsletter(&self, email: &str) -> UnifiedResult<NewsletterResponse> {
        let body = NewsletterRequest {
            email: email.to_string(),
        };
        self.send_json(RequestDescriptor::post(endpoints::NEWSLETTER_SUBSCRIBE), &body)
            .await
    }

    /// Unsubscribes `email` from the newsletter.
    #[instrument(skip_all)]
    pub async fn unsubscribe_newsletter(&self, email: &str) -> UnifiedResult<NewsletterResponse> {
        let body = NewsletterRequest {
            email: email.to_string(),
        };
        self.send_json(
            RequestDescriptor::post(endpoints::NEWSLETTER_UNSUBSCRIBE),
            &body,
        )
        .await
    }

    /// Recent social media posts.
    #[instrument(skip(self))]
    pub async fn social_feed(&self) -> UnifiedResult<Vec<SocialPost>> {
        self.read(RequestDescriptor::get(endpoints::SOCIAL_FEED)).await
    }
}

impl std::fmt::Debug for BarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarClient")
            .field("base_url", &self.context().base_url())
            .field("offline", &self.orchestrator.has_offline())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`BarClient`].
pub struct BarClientBuilder {
    config: AppConfig,
    token_store: Option<Arc<dyn TokenStore>>,
    offline: bool,
    policy: Option<PolicySnapshot>,
}

impl BarClientBuilder {
    /// Creates a builder. The offline dataset is attached by default.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            token_store: None,
            offline: true,
            policy: None,
        }
    }

    /// Persists the session token in `store` instead of the default file.
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Enables or disables the offline dataset.
    pub fn offline(mut self, enabled: bool) -> Self {
        self.offline = enabled;
        self
    }

    /// Seeds the routing policy.
    pub fn policy(mut self, snapshot: PolicySnapshot) -> Self {
        self.policy = Some(snapshot);
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<BarClient, ApiError> {
        let store = self
            .token_store
            .unwrap_or_else(|| Arc::new(FileTokenStore::default_location()));
        let policy = Arc::new(
            self.policy
                .map(OrchestrationPolicy::from_snapshot)
                .unwrap_or_default(),
        );

        let ctx = Arc::new(
            FetchContext::builder()
                .settings(self.config.fetch_settings())
                .token_store(store)
                .fallback_token(self.config.api_token.clone())
                .policy(policy)
                .build(),
        );

        let mut orchestrator = Orchestrator::new(Arc::clone(&ctx))?;
        if self.offline {
            orchestrator = orchestrator.with_offline(Arc::new(OfflineStore::builtin()?));
        }
        let monitor = Arc::new(HealthMonitor::new(ctx)?);

        debug!(
            base_url = %self.config.api_url,
            environment = %self.config.environment,
            offline = self.offline,
            "Built bar client"
        );
        Ok(BarClient::from_parts(orchestrator, monitor))
    }
}
