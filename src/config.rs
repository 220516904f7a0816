//! Client configuration.
//!
//! A [`Config`] is an immutable snapshot of endpoints, credentials and policy
//! knobs, constructed once per client. "Updating" a configuration means
//! building a new snapshot (see [`Config::to_builder`]); components holding
//! the old snapshot are unaffected.

use std::num::NonZeroU32;
use std::time::Duration;

use url::Url;

use crate::auth::Credentials;
use crate::error::WallexError;

/// Default REST API base URL.
pub const WALLEX_REST_URL: &str = "https://api.wallex.ir";
/// Default WebSocket URL.
pub const WALLEX_WS_URL: &str = "wss://api.wallex.ir";

/// Reconnection policy for the streaming client.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Maximum number of reconnection attempts (None = unbounded).
    pub max_attempts: Option<u32>,
    /// Initial backoff before the first reconnection attempt.
    pub initial_backoff: Duration,
    /// Backoff ceiling.
    pub max_backoff: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
        }
    }
}

/// Immutable configuration snapshot for one client instance.
#[derive(Debug, Clone)]
pub struct Config {
    /// REST API base URL.
    pub rest_url: Url,
    /// WebSocket URL.
    pub ws_url: Url,
    /// Credentials for authenticated endpoints.
    pub credentials: Option<Credentials>,
    /// Per-request timeout (applies to each attempt individually).
    pub timeout: Duration,
    /// Maximum number of retries for transient failures.
    pub max_retries: u32,
    /// Base delay for the exponential retry backoff.
    pub retry_delay: Duration,
    /// Streaming reconnection policy.
    pub reconnect: ReconnectPolicy,
    /// Client-side request quota, per minute. None disables smoothing.
    pub rate_limit_per_minute: Option<NonZeroU32>,
    /// User agent sent with REST requests.
    pub user_agent: String,
}

impl Config {
    /// Create a configuration builder with default settings.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Build a configuration from `WALLEX_*` environment variables.
    ///
    /// Recognized variables: `WALLEX_API_KEY`, `WALLEX_API_SECRET`,
    /// `WALLEX_BASE_URL`, `WALLEX_WS_URL`, `WALLEX_TIMEOUT_SECS`,
    /// `WALLEX_MAX_RETRIES`, `WALLEX_RETRY_DELAY_MS`. Unset variables keep
    /// their defaults; unparseable values are rejected.
    pub fn from_env() -> Result<Self, WallexError> {
        let mut builder = Self::builder();

        if let Some(creds) = Credentials::try_from_env() {
            builder = builder.credentials(creds);
        }
        if let Ok(url) = std::env::var("WALLEX_BASE_URL") {
            builder = builder.rest_url(url);
        }
        if let Ok(url) = std::env::var("WALLEX_WS_URL") {
            builder = builder.ws_url(url);
        }
        if let Ok(secs) = std::env::var("WALLEX_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| WallexError::Config("WALLEX_TIMEOUT_SECS must be an integer".into()))?;
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Ok(retries) = std::env::var("WALLEX_MAX_RETRIES") {
            let retries: u32 = retries
                .parse()
                .map_err(|_| WallexError::Config("WALLEX_MAX_RETRIES must be an integer".into()))?;
            builder = builder.max_retries(retries);
        }
        if let Ok(ms) = std::env::var("WALLEX_RETRY_DELAY_MS") {
            let ms: u64 = ms
                .parse()
                .map_err(|_| WallexError::Config("WALLEX_RETRY_DELAY_MS must be an integer".into()))?;
            builder = builder.retry_delay(Duration::from_millis(ms));
        }

        builder.build()
    }

    /// Start a builder pre-populated with this snapshot's values.
    ///
    /// This is how a configuration is "updated": derive a new snapshot and
    /// construct new components from it.
    pub fn to_builder(&self) -> ConfigBuilder {
        ConfigBuilder {
            rest_url: self.rest_url.to_string(),
            ws_url: self.ws_url.to_string(),
            credentials: self.credentials.clone(),
            timeout: self.timeout,
            max_retries: self.max_retries,
            retry_delay: self.retry_delay,
            reconnect: self.reconnect.clone(),
            rate_limit_per_minute: self.rate_limit_per_minute,
            user_agent: self.user_agent.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        // Defaults are valid by construction.
        Self::builder().build().expect("default config is valid")
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    rest_url: String,
    ws_url: String,
    credentials: Option<Credentials>,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
    reconnect: ReconnectPolicy,
    rate_limit_per_minute: Option<NonZeroU32>,
    user_agent: String,
}

impl ConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            rest_url: WALLEX_REST_URL.to_string(),
            ws_url: WALLEX_WS_URL.to_string(),
            credentials: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            reconnect: ReconnectPolicy::default(),
            rate_limit_per_minute: NonZeroU32::new(1200),
            user_agent: format!("wallex-api-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the REST base URL (useful for testing with a mock server).
    pub fn rest_url(mut self, url: impl Into<String>) -> Self {
        self.rest_url = url.into();
        self
    }

    /// Set the WebSocket URL.
    pub fn ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = url.into();
        self
    }

    /// Set the credentials for authenticated endpoints.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retries for transient failures.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay for the exponential retry backoff.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the streaming reconnection policy.
    pub fn reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Set the client-side per-minute request quota. None disables it.
    pub fn rate_limit_per_minute(mut self, quota: Option<NonZeroU32>) -> Self {
        self.rate_limit_per_minute = quota;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validate and build the configuration snapshot.
    pub fn build(self) -> Result<Config, WallexError> {
        let rest_url = Url::parse(&self.rest_url)?;
        if !matches!(rest_url.scheme(), "http" | "https") {
            return Err(WallexError::Config(format!(
                "REST URL must use http or https, got {}",
                rest_url.scheme()
            )));
        }

        let ws_url = Url::parse(&self.ws_url)?;
        if !matches!(ws_url.scheme(), "ws" | "wss") {
            return Err(WallexError::Config(format!(
                "WebSocket URL must use ws or wss, got {}",
                ws_url.scheme()
            )));
        }

        if self.timeout.is_zero() {
            return Err(WallexError::Config("timeout must be positive".into()));
        }
        if self.retry_delay.is_zero() {
            return Err(WallexError::Config("retry delay must be positive".into()));
        }
        if self.reconnect.initial_backoff.is_zero() || self.reconnect.max_backoff.is_zero() {
            return Err(WallexError::Config(
                "reconnect backoff durations must be positive".into(),
            ));
        }

        Ok(Config {
            rest_url,
            ws_url,
            credentials: self.credentials,
            timeout: self.timeout,
            max_retries: self.max_retries,
            retry_delay: self.retry_delay,
            reconnect: self.reconnect,
            rate_limit_per_minute: self.rate_limit_per_minute,
            user_agent: self.user_agent,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert_eq!(config.rest_url.as_str(), "https://api.wallex.ir/");
        assert_eq!(config.max_retries, 3);
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_rejects_bad_schemes() {
        assert!(Config::builder().rest_url("ftp://api.wallex.ir").build().is_err());
        assert!(Config::builder().ws_url("https://api.wallex.ir").build().is_err());
    }

    #[test]
    fn test_rejects_zero_durations() {
        assert!(Config::builder().timeout(Duration::ZERO).build().is_err());
        assert!(Config::builder().retry_delay(Duration::ZERO).build().is_err());
    }

    #[test]
    fn test_to_builder_produces_new_snapshot() {
        let original = Config::default();
        let updated = original
            .to_builder()
            .max_retries(7)
            .build()
            .unwrap();

        assert_eq!(updated.max_retries, 7);
        // The original snapshot is untouched.
        assert_eq!(original.max_retries, 3);
    }
}
