//! Live smoke tests against the real exchange.
//!
//! These hit api.wallex.ir and are ignored by default. Run with:
//! `cargo test --test live_smoke -- --ignored`

use wallex_api_client::rest::RestClient;

#[tokio::test]
#[ignore = "hits the live exchange"]
async fn live_get_markets() {
    dotenv::dotenv().ok();

    let client = RestClient::new();
    let markets = client.get_markets().await.expect("markets call failed");
    assert!(!markets.symbols.is_empty());
}

#[tokio::test]
#[ignore = "hits the live exchange"]
async fn live_get_orderbook() {
    dotenv::dotenv().ok();

    let client = RestClient::new();
    let depth = client.get_orderbook("BTCUSDT").await.expect("depth call failed");
    assert!(!depth.ask.is_empty() || !depth.bid.is_empty());
}
