//! Integration tests for the REST request pipeline: retry policy, error
//! classification, and request signing.

use std::time::Duration;

use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wallex_api_client::auth::Credentials;
use wallex_api_client::rest::RestClient;
use wallex_api_client::{Config, WallexError};

fn test_config(server: &MockServer, max_retries: u32) -> Config {
    Config::builder()
        .rest_url(server.uri())
        .timeout(Duration::from_secs(5))
        .max_retries(max_retries)
        .retry_delay(Duration::from_millis(10))
        .rate_limit_per_minute(None)
        .build()
        .unwrap()
}

fn build_client(server: &MockServer, max_retries: u32) -> RestClient {
    RestClient::with_config(test_config(server, max_retries))
}

fn build_authed_client(server: &MockServer, max_retries: u32) -> RestClient {
    let config = test_config(server, max_retries)
        .to_builder()
        .credentials(Credentials::new("test_key", "test_secret"))
        .build()
        .unwrap();
    RestClient::with_config(config)
}

fn markets_body() -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "message": "OK",
        "result": {
            "symbols": {
                "BTCUSDT": {
                    "symbol": "BTCUSDT",
                    "baseAsset": "BTC",
                    "quoteAsset": "USDT",
                    "stats": {
                        "bidPrice": "43000.00",
                        "askPrice": "43010.00",
                        "lastPrice": "43005.00"
                    }
                }
            }
        }
    })
}

#[tokio::test]
async fn test_get_markets_parses_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(markets_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server, 3);
    let markets = client.get_markets().await.unwrap();

    let btc = &markets.symbols["BTCUSDT"];
    assert_eq!(btc.base_asset, "BTC");
    assert_eq!(btc.stats.last_price, "43005.00".parse().unwrap());
}

#[tokio::test]
async fn test_5xx_retried_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/markets"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(markets_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server, 3);
    let markets = client.get_markets().await.unwrap();
    assert_eq!(markets.symbols.len(), 1);
}

#[tokio::test]
async fn test_retry_exhaustion_preserves_last_error() {
    let server = MockServer::start().await;

    // max_retries = 2 permits 3 attempts; the server never recovers.
    Mock::given(method("GET"))
        .and(path("/v1/markets"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = build_client(&server, 2);
    let err = client.get_markets().await.unwrap_err();

    // The root cause survives; no generic "retries exhausted" wrapper.
    match err {
        WallexError::Api(api) => assert_eq!(api.status, Some(500)),
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_success_beyond_retry_budget_is_not_reached() {
    let server = MockServer::start().await;

    // The server would succeed on the 4th attempt, but max_retries = 2
    // permits only 3; the pipeline must stop with the last failure.
    Mock::given(method("GET"))
        .and(path("/v1/markets"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(3)
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(markets_body()))
        .expect(0)
        .mount(&server)
        .await;

    let client = build_client(&server, 2);
    let err = client.get_markets().await.unwrap_err();
    match err {
        WallexError::Api(api) => assert_eq!(api.status, Some(500)),
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_400_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/depth"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "success": false,
            "message": "symbol is required"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server, 5);
    let err = client.get_orderbook("").await.unwrap_err();
    assert!(matches!(err, WallexError::Validation(_)));
}

#[tokio::test]
async fn test_404_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/markets/NOPEUSDT"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server, 5);
    let err = client.get_market_stats("NOPEUSDT").await.unwrap_err();
    match err {
        WallexError::Api(api) => assert_eq!(api.status, Some(404)),
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_429_retried_with_hint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/markets"))
        .respond_with(
            ResponseTemplate::new(429).insert_header("Retry-After", "0"),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(markets_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server, 2);
    let markets = client.get_markets().await.unwrap();
    assert_eq!(markets.symbols.len(), 1);
}

#[tokio::test]
async fn test_embedded_failure_on_http_200() {
    let server = MockServer::start().await;

    // HTTP 200 but the application-level indicator says failure.
    Mock::given(method("GET"))
        .and(path("/v1/markets/XYZUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "code": "SYMBOL_NOT_FOUND",
            "message": "no such market"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server, 3);
    let err = client.get_market_stats("XYZUSDT").await.unwrap_err();
    match err {
        WallexError::Api(api) => {
            assert_eq!(api.code.as_deref(), Some("SYMBOL_NOT_FOUND"));
            assert_eq!(api.message, "no such market");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_embedded_rate_limit_on_http_200_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "code": "TOO_MANY_REQUESTS",
            "message": "slow down"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(markets_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server, 1);
    let markets = client.get_markets().await.unwrap();
    assert_eq!(markets.symbols.len(), 1);
}

#[tokio::test]
async fn test_undecodable_body_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server, 3);
    let err = client.get_markets().await.unwrap_err();
    match err {
        WallexError::Api(api) => {
            let payload = api.payload.unwrap();
            assert!(payload.contains("<html>"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_credentials_short_circuits() {
    let server = MockServer::start().await;

    // No HTTP request may ever be issued.
    Mock::given(method("GET"))
        .and(path("/v1/account/balances"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = build_client(&server, 3);
    let err = client.get_balances().await.unwrap_err();
    assert!(matches!(err, WallexError::Auth(_)));
}

#[tokio::test]
async fn test_signed_request_carries_auth_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/account/balances"))
        .and(header_exists("X-API-Key"))
        .and(header_exists("X-API-Timestamp"))
        .and(header_exists("X-API-Signature"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "result": {
                "balances": {
                    "BTC": {"faName": "بیت کوین", "fiat": false, "value": "1.5", "locked": "0.5"},
                    "TMN": {"fiat": true, "value": "2000000", "locked": "0"}
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_authed_client(&server, 3);
    let balances = client.get_balances().await.unwrap();

    assert_eq!(balances.balances.len(), 2);
    assert_eq!(
        balances.balances["BTC"].available(),
        "1.0".parse().unwrap()
    );
}

#[tokio::test]
async fn test_query_parameters_sorted_in_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/trades"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "result": {"latestTrades": [
                {"price": "43000", "quantity": "0.1", "isBuyOrder": true}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server, 0);
    let trades = client.get_trades("BTCUSDT", Some(10)).await.unwrap();
    assert_eq!(trades.latest_trades.len(), 1);
    assert!(trades.latest_trades[0].is_buy_order);

    // The encoded query has keys in ascending order.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("limit=10&symbol=BTCUSDT"));
}

#[tokio::test]
async fn test_per_request_timeout_classified() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/markets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(markets_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = Config::builder()
        .rest_url(server.uri())
        .timeout(Duration::from_millis(100))
        .max_retries(0)
        .retry_delay(Duration::from_millis(10))
        .rate_limit_per_minute(None)
        .build()
        .unwrap();
    let client = RestClient::with_config(config);

    let err = client.get_markets().await.unwrap_err();
    assert!(matches!(err, WallexError::Timeout));
}

#[tokio::test]
async fn test_connection_refused_classified_as_network() {
    // Bind a port, then free it so connections are refused.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = Config::builder()
        .rest_url(format!("http://{addr}"))
        .timeout(Duration::from_secs(1))
        .max_retries(2)
        .retry_delay(Duration::from_millis(10))
        .rate_limit_per_minute(None)
        .build()
        .unwrap();
    let client = RestClient::with_config(config);

    let err = client.get_markets().await.unwrap_err();
    assert!(matches!(err, WallexError::Network(_)), "got {err:?}");
}
