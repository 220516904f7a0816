//! Error types for the Wallex client library.

use std::time::Duration;

use thiserror::Error;

/// Maximum number of bytes of a raw response body kept in an [`ApiError`].
const EXCERPT_LIMIT: usize = 256;

/// The main error type for all Wallex client operations.
///
/// Every failure path in the crate resolves to exactly one variant of this
/// enum; callers never see a bare transport or serialization error.
#[derive(Error, Debug)]
pub enum WallexError {
    /// Missing or invalid credentials.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Malformed caller input, or an HTTP 400 from the exchange.
    #[error("validation error: {0}")]
    Validation(String),

    /// Server-signaled throttling (HTTP 429 or an API throttle code).
    #[error("rate limit exceeded, retry after {retry_after:?}")]
    RateLimit {
        /// Server-provided wait hint, if the response carried one.
        retry_after: Option<Duration>,
    },

    /// Connectivity-level failure (connection refused, DNS, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The configured deadline elapsed, or the call was cancelled.
    #[error("request timed out")]
    Timeout,

    /// The Wallex API returned an error, or the response was malformed.
    #[error("Wallex API error: {0}")]
    Api(ApiError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// WebSocket transport error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// The streaming session ended and could not be restored.
    #[error("connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for the closure.
        reason: String,
    },

    /// Invalid configuration snapshot.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Fallback for conditions outside the taxonomy. Never swallowed.
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl WallexError {
    /// Whether the request pipeline may retry after this error.
    ///
    /// Network-level failures, timeouts and rate limits are transient; API
    /// errors are retried only when the exchange answered with a 5xx status.
    /// Everything else is a caller error and is surfaced immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            WallexError::Network(_) | WallexError::Timeout | WallexError::RateLimit { .. } => true,
            WallexError::Api(api) => api.status.is_some_and(|s| s >= 500),
            _ => false,
        }
    }

    /// Classify a transport-level failure from `reqwest`.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WallexError::Timeout
        } else {
            WallexError::Network(err.to_string())
        }
    }

    /// Classify a non-2xx HTTP response.
    ///
    /// `payload` is the parsed body when the response carried decodable JSON.
    pub(crate) fn from_status(
        status: u16,
        payload: Option<serde_json::Value>,
        retry_after: Option<Duration>,
    ) -> Self {
        match status {
            429 => WallexError::RateLimit { retry_after },
            400 => WallexError::Validation(payload_message(&payload, "bad request")),
            401 | 403 => WallexError::Auth(payload_message(&payload, "unauthorized")),
            _ => WallexError::Api(ApiError::from_payload(status, payload)),
        }
    }

    /// Classify an application-level failure embedded in a 2xx response.
    ///
    /// Wallex responses carry an explicit `success` indicator; a response can
    /// be HTTP 200 and still describe a failure.
    pub(crate) fn from_api_failure(status: u16, payload: serde_json::Value) -> Self {
        let api = ApiError::from_payload(status, Some(payload));
        if api.is_rate_limit() {
            WallexError::RateLimit { retry_after: None }
        } else if api.is_auth() {
            WallexError::Auth(api.to_string())
        } else if api.is_validation() {
            WallexError::Validation(api.to_string())
        } else {
            WallexError::Api(api)
        }
    }
}

impl From<reqwest::Error> for WallexError {
    fn from(err: reqwest::Error) -> Self {
        WallexError::from_transport(err)
    }
}

impl From<reqwest_middleware::Error> for WallexError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => WallexError::from_transport(e),
            reqwest_middleware::Error::Middleware(e) => WallexError::Unknown(e.to_string()),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for WallexError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => WallexError::ConnectionClosed {
                reason: "transport closed".to_string(),
            },
            WsError::Io(e) => WallexError::Network(e.to_string()),
            other => WallexError::WebSocket(other.to_string()),
        }
    }
}

/// An error reported by the Wallex API itself.
///
/// Carries the HTTP status (when the error arrived over REST), the
/// application error code if one was present, and a truncated excerpt of the
/// raw payload for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code, if the error arrived in an HTTP response.
    pub status: Option<u16>,
    /// Application-level error code (e.g. `INVALID_SIGNATURE`).
    pub code: Option<String>,
    /// Human-readable error message.
    pub message: String,
    /// Truncated raw payload for diagnostics.
    pub payload: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(status) = self.status {
            write!(f, "HTTP {status}: ")?;
        }
        if let Some(code) = &self.code {
            write!(f, "[{code}] ")?;
        }
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    /// Create a new API error from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: Some(code.into()),
            message: message.into(),
            payload: None,
        }
    }

    /// Build an API error out of a response payload.
    ///
    /// Wallex error bodies look like `{"success": false, "code":
    /// "SYMBOL_NOT_FOUND", "message": "..."}`, but code and message are both
    /// optional in practice.
    pub(crate) fn from_payload(status: u16, payload: Option<serde_json::Value>) -> Self {
        let code = payload
            .as_ref()
            .and_then(|v| v.get("code").or_else(|| v.get("error_code")))
            .and_then(|c| c.as_str())
            .map(str::to_string);
        let message = payload
            .as_ref()
            .and_then(|v| v.get("message").or_else(|| v.get("error")))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error {status}"));
        let payload = payload.as_ref().map(|v| excerpt(&v.to_string()));

        Self {
            status: Some(status),
            code,
            message,
            payload,
        }
    }

    /// Build an API error from a raw, undecodable body.
    pub(crate) fn from_raw(status: u16, body: &str) -> Self {
        Self {
            status: Some(status),
            code: None,
            message: "invalid response body".to_string(),
            payload: Some(excerpt(body)),
        }
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limit(&self) -> bool {
        matches!(
            self.code.as_deref(),
            Some(codes::RATE_LIMIT_EXCEEDED) | Some(codes::TOO_MANY_REQUESTS)
        )
    }

    /// Check if this is an authentication error.
    pub fn is_auth(&self) -> bool {
        matches!(
            self.code.as_deref(),
            Some(codes::INVALID_API_KEY)
                | Some(codes::INVALID_SIGNATURE)
                | Some(codes::INVALID_TIMESTAMP)
                | Some(codes::API_KEY_EXPIRED)
        )
    }

    /// Check if this is a request-validation error.
    pub fn is_validation(&self) -> bool {
        matches!(
            self.code.as_deref(),
            Some(codes::INVALID_PARAMETER) | Some(codes::MISSING_PARAMETER)
        )
    }
}

/// Known Wallex error codes for pattern matching.
pub mod codes {
    /// Authentication errors.
    pub const INVALID_API_KEY: &str = "INVALID_API_KEY";
    pub const INVALID_SIGNATURE: &str = "INVALID_SIGNATURE";
    pub const INVALID_TIMESTAMP: &str = "INVALID_TIMESTAMP";
    pub const API_KEY_EXPIRED: &str = "API_KEY_EXPIRED";

    /// Throttling errors.
    pub const RATE_LIMIT_EXCEEDED: &str = "RATE_LIMIT_EXCEEDED";
    pub const TOO_MANY_REQUESTS: &str = "TOO_MANY_REQUESTS";

    /// Validation errors.
    pub const INVALID_PARAMETER: &str = "INVALID_PARAMETER";
    pub const MISSING_PARAMETER: &str = "MISSING_PARAMETER";
    pub const INVALID_SYMBOL: &str = "INVALID_SYMBOL";

    /// Order errors.
    pub const INSUFFICIENT_BALANCE: &str = "INSUFFICIENT_BALANCE";
    pub const ORDER_NOT_FOUND: &str = "ORDER_NOT_FOUND";
    pub const MIN_NOTIONAL: &str = "MIN_NOTIONAL";

    /// Market errors.
    pub const MARKET_CLOSED: &str = "MARKET_CLOSED";
    pub const SYMBOL_NOT_FOUND: &str = "SYMBOL_NOT_FOUND";
    pub const TRADING_DISABLED: &str = "TRADING_DISABLED";
}

fn payload_message(payload: &Option<serde_json::Value>, fallback: &str) -> String {
    payload
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or(fallback)
        .to_string()
}

/// Truncate a raw body for inclusion in diagnostics.
pub(crate) fn excerpt(body: &str) -> String {
    if body.len() <= EXCERPT_LIMIT {
        return body.to_string();
    }
    let mut end = EXCERPT_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            WallexError::from_status(400, None, None),
            WallexError::Validation(_)
        ));
        assert!(matches!(
            WallexError::from_status(401, None, None),
            WallexError::Auth(_)
        ));
        assert!(matches!(
            WallexError::from_status(429, None, Some(Duration::from_secs(2))),
            WallexError::RateLimit {
                retry_after: Some(_)
            }
        ));
        assert!(matches!(
            WallexError::from_status(503, None, None),
            WallexError::Api(_)
        ));
    }

    #[test]
    fn test_retryability() {
        assert!(WallexError::Timeout.is_retryable());
        assert!(WallexError::Network("reset".into()).is_retryable());
        assert!(WallexError::RateLimit { retry_after: None }.is_retryable());
        assert!(WallexError::from_status(500, None, None).is_retryable());
        assert!(!WallexError::from_status(404, None, None).is_retryable());
        assert!(!WallexError::Validation("bad symbol".into()).is_retryable());
        assert!(!WallexError::Auth("no key".into()).is_retryable());
    }

    #[test]
    fn test_embedded_failure_classification() {
        let err = WallexError::from_api_failure(
            200,
            json!({"success": false, "code": "TOO_MANY_REQUESTS", "message": "slow down"}),
        );
        assert!(matches!(err, WallexError::RateLimit { .. }));

        let err = WallexError::from_api_failure(
            200,
            json!({"success": false, "code": "INVALID_SIGNATURE", "message": "bad sig"}),
        );
        assert!(matches!(err, WallexError::Auth(_)));

        let err = WallexError::from_api_failure(
            200,
            json!({"success": false, "code": "SYMBOL_NOT_FOUND", "message": "no such market"}),
        );
        assert!(matches!(err, WallexError::Api(_)));
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::from_payload(
            422,
            Some(json!({"code": "MIN_NOTIONAL", "message": "order too small"})),
        );
        assert_eq!(err.to_string(), "HTTP 422: [MIN_NOTIONAL] order too small");
    }

    #[test]
    fn test_payload_excerpt_truncated() {
        let long_body = "x".repeat(EXCERPT_LIMIT * 2);
        let err = ApiError::from_raw(500, &long_body);
        let payload = err.payload.unwrap();
        assert!(payload.len() < long_body.len());
        assert!(payload.ends_with("..."));
    }
}
