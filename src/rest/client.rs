//! Wallex REST API client implementation.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::auth::{IncreasingTimestamp, TimestampProvider, sign_request};
use crate::config::Config;
use crate::error::{ApiError, WallexError};
use crate::rate_limit::RequestQuota;

/// One logical API call: method, path, query, optional body, and whether
/// credentials must be attached.
///
/// Descriptors are built per call and discarded once the call completes.
/// Query keys are unique and sorted by construction; absent values are never
/// inserted, so encoding the same mapping always yields the same string.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: BTreeMap<String, String>,
    body: Option<serde_json::Value>,
    requires_auth: bool,
}

impl Request {
    /// Create a GET request descriptor.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST request descriptor.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Create a DELETE request descriptor.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            body: None,
            requires_auth: false,
        }
    }

    /// Add a query parameter. Re-adding a key replaces the previous value.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(key.into(), value.to_string());
        self
    }

    /// Add a query parameter if the value is present.
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: impl serde::Serialize) -> Result<Self, WallexError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Mark the request as requiring credentials.
    pub fn authenticated(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Encode the query string: keys ascending, values percent-encoded.
    fn encoded_query(&self) -> Result<String, WallexError> {
        serde_urlencoded::to_string(&self.query)
            .map_err(|e| WallexError::Validation(format!("unencodable query: {e}")))
    }
}

/// The Wallex REST API client.
///
/// The client is cheap to clone and safe to use concurrently; each call
/// touches only the read-only configuration snapshot, the timestamp counter
/// and the optional rate limiter.
///
/// # Example
///
/// ```rust,no_run
/// use wallex_api_client::rest::RestClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = RestClient::new();
///     let markets = client.get_markets().await?;
///     println!("{} markets", markets.symbols.len());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct RestClient {
    http: ClientWithMiddleware,
    config: Arc<Config>,
    timestamps: Arc<dyn TimestampProvider>,
    quota: Option<Arc<RequestQuota>>,
}

impl RestClient {
    /// Create a client with the default configuration.
    ///
    /// Without credentials the client can only reach public endpoints; use
    /// [`RestClient::with_config`] or [`RestClient::builder`] for private
    /// endpoints.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a client from a configuration snapshot.
    pub fn with_config(config: Config) -> Self {
        Self::builder(config).build()
    }

    /// Create a client builder around a configuration snapshot.
    pub fn builder(config: Config) -> RestClientBuilder {
        RestClientBuilder::new(config)
    }

    /// The configuration snapshot this client was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute a request descriptor, retrying transient failures.
    ///
    /// At most `max_retries + 1` attempts are made. The delay before attempt
    /// *n* (n ≥ 2) is `retry_delay * 2^(n-2)`, except that a rate-limit error
    /// carrying a server hint sleeps for the hint instead. Non-retryable
    /// errors and exhaustion surface the last classified error unchanged.
    pub async fn execute<T>(&self, request: Request) -> Result<T, WallexError>
    where
        T: serde::de::DeserializeOwned,
    {
        if request.requires_auth && self.config.credentials.is_none() {
            return Err(WallexError::Auth(
                "API key and secret required for this endpoint".to_string(),
            ));
        }

        if let Some(quota) = &self.quota {
            quota.acquire().await;
        }

        let query = request.encoded_query()?;
        let body = match &request.body {
            Some(body) => serde_json::to_string(body)?,
            None => String::new(),
        };

        let max_attempts = self.config.max_retries.saturating_add(1);
        let mut attempt: u32 = 1;

        loop {
            let outcome = self.attempt(&request, &query, &body).await;

            match outcome {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !err.is_retryable() || attempt >= max_attempts {
                        return Err(err);
                    }

                    let delay = match &err {
                        WallexError::RateLimit {
                            retry_after: Some(hint),
                        } => *hint,
                        _ => backoff_delay(self.config.retry_delay, attempt),
                    };

                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        path = %request.path,
                        "transient failure, retrying"
                    );

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One attempt: build, sign, send, classify.
    async fn attempt<T>(&self, request: &Request, query: &str, body: &str) -> Result<T, WallexError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut url = self.config.rest_url.join(&request.path)?;
        if !query.is_empty() {
            url.set_query(Some(query));
        }

        let mut builder = self.http.request(request.method.clone(), url);

        if request.body.is_some() {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }

        if request.requires_auth {
            let credentials = self
                .config
                .credentials
                .as_ref()
                .ok_or_else(|| WallexError::Auth("credentials not configured".to_string()))?;

            // A fresh timestamp per attempt; each signature is valid once.
            let timestamp = self.timestamps.next_timestamp();
            let signature = sign_request(
                credentials,
                request.method.as_str(),
                &request.path,
                query,
                body,
                timestamp,
            )?;

            builder = builder
                .header("X-API-Key", &credentials.api_key)
                .header("X-API-Timestamp", timestamp.to_string())
                .header("X-API-Signature", signature);
        }

        let response = builder.send().await?;
        self.parse_response(response).await
    }

    /// Parse a response from the Wallex API.
    ///
    /// Wallex wraps results in `{"success": bool, "message": ..., "result":
    /// ...}` and may report failures with HTTP 200, so the embedded indicator
    /// is authoritative. Endpoints outside the envelope (the UDF candle feed)
    /// are decoded from the whole body.
    async fn parse_response<T>(&self, response: reqwest::Response) -> Result<T, WallexError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        let body = response.text().await.map_err(WallexError::from_transport)?;

        if !status.is_success() {
            let payload = serde_json::from_str::<serde_json::Value>(&body).ok();
            return Err(WallexError::from_status(
                status.as_u16(),
                payload,
                retry_after,
            ));
        }

        let envelope: serde_json::Value = serde_json::from_str(&body)
            .map_err(|_| WallexError::Api(ApiError::from_raw(status.as_u16(), &body)))?;

        if envelope.get("success").and_then(|s| s.as_bool()) == Some(false) {
            return Err(WallexError::from_api_failure(status.as_u16(), envelope));
        }

        let payload = match envelope.get("result") {
            Some(result) if envelope.get("success").is_some() => result.clone(),
            _ => envelope,
        };

        serde_json::from_value(payload).map_err(|e| {
            WallexError::Api(ApiError {
                status: Some(status.as_u16()),
                code: None,
                message: format!("failed to decode result: {e}"),
                payload: Some(crate::error::excerpt(&body)),
            })
        })
    }
}

impl Default for RestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("rest_url", &self.config.rest_url.as_str())
            .field("has_credentials", &self.config.credentials.is_some())
            .finish()
    }
}

/// Backoff delay after `completed_attempts` failed attempts.
///
/// Equals `base * 2^(completed_attempts - 1)`, i.e. the delay before attempt
/// *n* is `base * 2^(n-2)`.
fn backoff_delay(base: Duration, completed_attempts: u32) -> Duration {
    let exponent = completed_attempts.saturating_sub(1);
    base.saturating_mul(2u32.saturating_pow(exponent))
}

/// Builder for [`RestClient`].
pub struct RestClientBuilder {
    config: Config,
    timestamps: Option<Arc<dyn TimestampProvider>>,
}

impl RestClientBuilder {
    /// Create a new builder around a configuration snapshot.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            timestamps: None,
        }
    }

    /// Set a custom timestamp provider (useful for tests).
    pub fn timestamp_provider(mut self, provider: Arc<dyn TimestampProvider>) -> Self {
        self.timestamps = Some(provider);
        self
    }

    /// Build the client.
    pub fn build(self) -> RestClient {
        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&self.config.user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("wallex-api-client"));
        headers.insert(USER_AGENT, user_agent);

        let reqwest_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let http = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        let quota = self
            .config
            .rate_limit_per_minute
            .map(|q| Arc::new(RequestQuota::per_minute(q)));

        let timestamps = self
            .timestamps
            .unwrap_or_else(|| Arc::new(IncreasingTimestamp::new()));

        RestClient {
            http,
            config: Arc::new(self.config),
            timestamps,
            quota,
        }
    }
}
