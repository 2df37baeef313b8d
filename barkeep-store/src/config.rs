//! Configuration management.
//!
//! Resolved once at start from `BARKEEP_*` environment variables:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `BARKEEP_API_URL` | `https://api.barkeep.example/api` |
//! | `BARKEEP_API_TOKEN` | none |
//! | `BARKEEP_SITE_ORIGIN` | none |
//! | `BARKEEP_DEBUG` | off |
//! | `BARKEEP_ENV` | `production` |
//! | `BARKEEP_TIMEOUT_SECS` | 15 |
//! | `BARKEEP_RATE_LIMIT_BACKOFF_MS` | 2000 |
//! | `BARKEEP_HEALTH_INTERVAL_SECS` | 30 |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use barkeep_fetch::FetchSettings;
use barkeep_fetch::context::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::StoreError;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "BARKEEP_";

// ============================================================================
// Environment
// ============================================================================

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development.
    Development,
    /// Pre-release.
    Staging,
    /// Live site.
    #[default]
    Production,
}

impl Environment {
    /// Returns the lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    /// Returns true for local development.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" | "stage" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(StoreError::Config(format!("unknown environment: {other}"))),
        }
    }
}

// ============================================================================
// App Config
// ============================================================================

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Backend base URL.
    pub api_url: String,
    /// Static fallback token.
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    /// Site origin sent by browser-like transports.
    pub site_origin: Option<String>,
    /// Debug logging in the CLI.
    pub debug: bool,
    /// Deployment environment.
    pub environment: Environment,
    /// Transport timeout.
    pub timeout: Duration,
    /// Rate-limit backoff.
    pub rate_limit_backoff: Duration,
    /// Health-check interval.
    pub health_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            site_origin: None,
            debug: false,
            environment: Environment::default(),
            timeout: fetch.timeout,
            rate_limit_backoff: fetch.rate_limit_backoff,
            health_interval: fetch.health_interval,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which receives full variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(url) = get("API_URL") {
            config.api_url = parse_http_url("BARKEEP_API_URL", &url)?;
        }
        config.api_token = get("API_TOKEN");
        if let Some(origin) = get("SITE_ORIGIN") {
            config.site_origin = Some(parse_http_url("BARKEEP_SITE_ORIGIN", &origin)?);
        }
        if let Some(debug) = get("DEBUG") {
            config.debug = parse_flag(&debug);
        }
        if let Some(env) = get("ENV") {
            config.environment = env.parse()?;
        }
        if let Some(secs) = get("TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_positive("BARKEEP_TIMEOUT_SECS", &secs)?);
        }
        if let Some(ms) = get("RATE_LIMIT_BACKOFF_MS") {
            config.rate_limit_backoff =
                Duration::from_millis(parse_number("BARKEEP_RATE_LIMIT_BACKOFF_MS", &ms)?);
        }
        if let Some(secs) = get("HEALTH_INTERVAL_SECS") {
            config.health_interval =
                Duration::from_secs(parse_number("BARKEEP_HEALTH_INTERVAL_SECS", &secs)?);
        }

        debug!(
            api_url = %config.api_url,
            environment = %config.environment,
            has_token = config.api_token.is_some(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Overrides the base URL.
    pub fn with_api_url(mut self, url: &str) -> Result<Self, StoreError> {
        self.api_url = parse_http_url("api url", url)?;
        Ok(self)
    }

    /// Fetch settings derived from this configuration.
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            base_url: self.api_url.clone(),
            site_origin: self.site_origin.clone(),
            timeout: self.timeout,
            rate_limit_backoff: self.rate_limit_backoff,
            health_interval: self.health_interval,
            ..FetchSettings::default()
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_number(name: &str, value: &str) -> Result<u64, StoreError> {
    value
        .parse()
        .map_err(|_| StoreError::Config(format!("{name} must be a non-negative integer, got {value:?}")))
}

fn parse_positive(name: &str, value: &str) -> Result<u64, StoreError> {
    match parse_number(name, value)? {
        0 => Err(StoreError::Config(format!("{name} must be at least 1"))),
        n => Ok(n),
    }
}

fn parse_http_url(name: &str, value: &str) -> Result<String, StoreError> {
    let url = Url::parse(value).map_err(|e| StoreError::Config(format!("{name}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(StoreError::Config(format!(
            "{name} must be http or https, got {}",
            url.scheme()
        )));
    }
    Ok(value.trim_end_matches('/').to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, "https://api.barkeep.example/api");
        assert!(config.api_token.is_none());
        assert!(!config.debug);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.rate_limit_backoff, Duration::from_millis(2000));
        assert_eq!(config.health_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("BARKEEP_API_URL", "http://localhost:3000/api/"),
            ("BARKEEP_API_TOKEN", "service-token"),
            ("BARKEEP_DEBUG", "true"),
            ("BARKEEP_ENV", "Staging"),
            ("BARKEEP_TIMEOUT_SECS", "5"),
            ("BARKEEP_RATE_LIMIT_BACKOFF_MS", "250"),
            ("BARKEEP_HEALTH_INTERVAL_SECS", "60"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert_eq!(config.api_token.as_deref(), Some("service-token"));
        assert!(config.debug);
        assert_eq!(config.environment, Environment::Staging);

        let settings = config.fetch_settings();
        assert_eq!(settings.base_url, "http://localhost:3000/api");
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.rate_limit_backoff, Duration::from_millis(250));
        assert_eq!(settings.health_interval, Duration::from_secs(60));
        assert_eq!(settings.xhr_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("BARKEEP_API_TOKEN", "  ")])).unwrap();
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_malformed_values_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("BARKEEP_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));

        let err = AppConfig::from_lookup(lookup(&[("BARKEEP_API_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));

        let err = AppConfig::from_lookup(lookup(&[("BARKEEP_API_URL", "ftp://example.com")])).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));

        let err = AppConfig::from_lookup(lookup(&[("BARKEEP_ENV", "qa")])).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("BARKEEP_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(err.to_string().contains("BARKEEP_TIMEOUT_SECS must be at least 1"));

        let config = AppConfig::from_lookup(lookup(&[("BARKEEP_TIMEOUT_SECS", "1")])).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_token_not_serialized() {
        let config = AppConfig {
            api_token: Some("secret".to_string()),
            ..AppConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
