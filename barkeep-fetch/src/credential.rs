//! Bearer credential provider.
//!
//! The provider resolves the token to attach to each request:
//!
//! 1. **Persisted token** - Set by login, kept by a [`TokenStore`]. Used
//!    only while its embedded `exp` claim lies in the future.
//! 2. **Static fallback** - A long-lived service token from configuration.
//!
//! The persisted value is read lazily on first use and cached for the
//! rest of the process. Malformed tokens are treated as expired; nothing
//! in this module panics or returns an error on a bad token.

use std::sync::Arc;

use async_trait::async_trait;
use base64::prelude::*;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace, warn};

use crate::error::CredentialError;

// ============================================================================
// Token Store
// ============================================================================

/// Durable storage for the session token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Reads the persisted token.
    async fn load(&self) -> Result<Option<String>, CredentialError>;

    /// Persists a token, replacing any previous one.
    async fn save(&self, token: &str) -> Result<(), CredentialError>;

    /// Erases the persisted token.
    async fn delete(&self) -> Result<(), CredentialError>;
}

/// In-memory token store. Lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.token.read().await.clone())
    }

    async fn save(&self, token: &str) -> Result<(), CredentialError> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn delete(&self) -> Result<(), CredentialError> {
        *self.token.write().await = None;
        Ok(())
    }
}

// ============================================================================
// Token Claims
// ============================================================================

/// Claims read from the token's payload segment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenClaims {
    /// Subject (user id).
    #[serde(default)]
    pub sub: Option<serde_json::Value>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Role.
    #[serde(default)]
    pub role: Option<String>,
    /// Issued at (seconds since epoch).
    #[serde(default)]
    pub iat: Option<i64>,
    /// Expires at (seconds since epoch).
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Returns true if the `exp` claim is at or before `now`.
    ///
    /// A token without `exp` never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| now.timestamp() >= exp)
    }
}

/// Decodes the payload segment of a `header.payload.signature` token.
///
/// The signature is not verified; the claims are only used to decide
/// whether the token is worth sending.
#[instrument(skip(token))]
pub fn decode_claims(token: &str) -> Result<TokenClaims, CredentialError> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(CredentialError::Malformed(format!(
            "expected 3 non-empty segments, got {}",
            parts.len()
        )));
    }

    let payload_b64 = parts[1];
    let decoded = BASE64_URL_SAFE_NO_PAD
        .decode(payload_b64)
        .or_else(|_| BASE64_STANDARD.decode(payload_b64))
        .map_err(|e| CredentialError::Decode(format!("base64: {e}")))?;

    let claims: TokenClaims = serde_json::from_slice(&decoded)
        .map_err(|e| CredentialError::Decode(format!("json: {e}")))?;

    trace!(exp = ?claims.exp, "Decoded token claims");
    Ok(claims)
}

/// Returns true if the token is expired at `now`. Malformed tokens count as expired.
pub fn is_token_expired(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims(token) {
        Ok(claims) => claims.is_expired_at(now),
        Err(e) => {
            debug!(error = %e, "Treating malformed token as expired");
            true
        }
    }
}

// ============================================================================
// Credential Provider
// ============================================================================

#[derive(Debug, Clone)]
enum Cached {
    Unloaded,
    Loaded(Option<String>),
}

/// Supplies the bearer credential for outgoing requests.
pub struct CredentialProvider {
    store: Arc<dyn TokenStore>,
    fallback: Option<String>,
    cache: RwLock<Cached>,
}

impl CredentialProvider {
    /// Creates a provider over `store` with an optional static fallback.
    pub fn new(store: Arc<dyn TokenStore>, fallback: Option<String>) -> Self {
        Self {
            store,
            fallback: fallback.filter(|t| !t.trim().is_empty()),
            cache: RwLock::new(Cached::Unloaded),
        }
    }

    /// Creates a provider with an in-memory store.
    pub fn in_memory(fallback: Option<String>) -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()), fallback)
    }

    /// Returns true if a static fallback token is configured.
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// The persisted token, read from the store on first use.
    async fn persisted(&self) -> Option<String> {
        if let Cached::Loaded(token) = &*self.cache.read().await {
            return token.clone();
        }

        let mut cache = self.cache.write().await;
        if let Cached::Loaded(token) = &*cache {
            return token.clone();
        }

        match self.store.load().await {
            Ok(token) => {
                let token = token.filter(|t| !t.trim().is_empty());
                debug!(present = token.is_some(), "Loaded persisted token");
                *cache = Cached::Loaded(token.clone());
                token
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token");
                None
            }
        }
    }

    /// Token to attach to the next request.
    ///
    /// The persisted token wins while unexpired; otherwise the static
    /// fallback (which may be absent).
    pub async fn get(&self) -> Option<String> {
        if let Some(token) = self.persisted().await {
            if !is_token_expired(&token, Utc::now()) {
                return Some(token);
            }
            debug!("Persisted token expired, using fallback");
        }
        self.fallback.clone()
    }

    /// Persists `token`, overriding the fallback.
    #[instrument(skip(self, token))]
    pub async fn set(&self, token: &str) -> Result<(), CredentialError> {
        self.store.save(token).await?;
        *self.cache.write().await = Cached::Loaded(Some(token.to_string()));
        debug!("Session token stored");
        Ok(())
    }

    /// Erases the persisted token. The fallback resumes.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), CredentialError> {
        self.store.delete().await?;
        *self.cache.write().await = Cached::Loaded(None);
        debug!("Session token cleared");
        Ok(())
    }

    /// Returns true if a persisted, unexpired session token exists.
    pub async fn is_authenticated(&self) -> bool {
        self.persisted()
            .await
            .is_some_and(|token| !is_token_expired(&token, Utc::now()))
    }

    /// Claims of the persisted session token.
    pub async fn session_claims(&self) -> Option<TokenClaims> {
        let token = self.persisted().await?;
        decode_claims(&token).ok()
    }
}

impl std::fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialProvider")
            .field("has_fallback", &self.fallback.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
