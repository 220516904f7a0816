//! HMAC-SHA256 signature generation for Wallex API authentication.
//!
//! Wallex private endpoints require a signature computed as:
//! ```text
//! HMAC-SHA256(method + path + sorted_query + body + timestamp_ms, api_secret)
//! ```
//!
//! The signature is hex-encoded and sent in the `X-API-Signature` header,
//! with the timestamp in `X-API-Timestamp` and the key in `X-API-Key`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::auth::Credentials;
use crate::error::WallexError;

type HmacSha256 = Hmac<Sha256>;

/// Build the canonical representation of a request for signing.
///
/// `query` must already be the encoded query string with keys in ascending
/// order; the request pipeline guarantees this by construction. `body` is the
/// serialized JSON body, or empty for body-less requests.
pub fn canonical_string(
    method: &str,
    path: &str,
    query: &str,
    body: &str,
    timestamp_ms: u64,
) -> String {
    format!("{method}{path}{query}{body}{timestamp_ms}")
}

/// Sign a request for Wallex's private API.
///
/// # Arguments
///
/// * `credentials` - API credentials containing the secret
/// * `method` - Uppercase HTTP method (e.g. "GET")
/// * `path` - The API endpoint path (e.g. "/v1/account/balances")
/// * `query` - Encoded query string, keys sorted ascending (may be empty)
/// * `body` - Serialized JSON body (may be empty)
/// * `timestamp_ms` - Millisecond timestamp, used once per call
///
/// # Returns
///
/// Hex-encoded HMAC-SHA256 signature.
pub fn sign_request(
    credentials: &Credentials,
    method: &str,
    path: &str,
    query: &str,
    body: &str,
    timestamp_ms: u64,
) -> Result<String, WallexError> {
    let payload = canonical_string(method, path, query, body, timestamp_ms);

    let mut hmac = HmacSha256::new_from_slice(credentials.expose_secret().as_bytes())
        .map_err(|e| WallexError::Auth(format!("invalid HMAC key: {e}")))?;
    hmac.update(payload.as_bytes());
    let digest = hmac.finalize().into_bytes();

    Ok(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_string_layout() {
        let canonical = canonical_string(
            "GET",
            "/v1/account/orders",
            "limit=10&symbol=BTCUSDT",
            "",
            1616492376594,
        );
        assert_eq!(
            canonical,
            "GET/v1/account/orderslimit=10&symbol=BTCUSDT1616492376594"
        );
    }

    #[test]
    fn test_signature_shape() {
        let credentials = Credentials::new("test_key", "test_secret_key_for_signing");
        let signature = sign_request(
            &credentials,
            "GET",
            "/v1/account/balances",
            "",
            "",
            1616492376594,
        )
        .unwrap();

        // HMAC-SHA256 produces 32 bytes, hex encoded = 64 chars.
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_signature_consistency() {
        // Same inputs should produce the same signature.
        let credentials = Credentials::new("key", "my_secret");

        let sig1 = sign_request(
            &credentials,
            "POST",
            "/v1/account/orders",
            "",
            r#"{"symbol":"BTCUSDT"}"#,
            12345,
        )
        .unwrap();
        let sig2 = sign_request(
            &credentials,
            "POST",
            "/v1/account/orders",
            "",
            r#"{"symbol":"BTCUSDT"}"#,
            12345,
        )
        .unwrap();

        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_signature_changes_with_timestamp() {
        let credentials = Credentials::new("key", "my_secret");

        let sig1 =
            sign_request(&credentials, "GET", "/v1/account/balances", "", "", 12345).unwrap();
        let sig2 =
            sign_request(&credentials, "GET", "/v1/account/balances", "", "", 12346).unwrap();

        assert_ne!(sig1, sig2);
    }

    #[test]
    fn test_signature_changes_with_query() {
        let credentials = Credentials::new("key", "my_secret");

        let sig1 = sign_request(
            &credentials,
            "GET",
            "/v1/account/trades",
            "symbol=BTCUSDT",
            "",
            12345,
        )
        .unwrap();
        let sig2 = sign_request(
            &credentials,
            "GET",
            "/v1/account/trades",
            "symbol=ETHUSDT",
            "",
            12345,
        )
        .unwrap();

        assert_ne!(sig1, sig2);
    }
}
