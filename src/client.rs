//! Unified client facade combining REST and WebSocket access.

use std::time::Duration;

use crate::config::Config;
use crate::error::WallexError;
use crate::rest::RestClient;
use crate::rest::private::{Balance, Balances, Order, OrderFilter, OrderRequest, Orders};
use crate::rest::public::{Depth, Market, Markets, RecentTrades};
use crate::ws::{ConnectionState, WsClient};

/// Unified Wallex client.
///
/// Composes a [`RestClient`] and a [`WsClient`] built from one configuration
/// snapshot, and forwards the most common operations. Use [`WallexClient::rest`]
/// and [`WallexClient::ws`] for the full API surface.
///
/// # Example
///
/// ```rust,no_run
/// use wallex_api_client::{Config, WallexClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = WallexClient::new(Config::from_env()?);
///
///     let balances = client.get_balances().await?;
///     println!("{} assets", balances.balances.len());
///
///     client.subscribe_trades("BTCUSDT", |channel, data| {
///         println!("{channel}: {data}");
///     });
///     client.connect_ws().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct WallexClient {
    config: Config,
    rest: RestClient,
    ws: WsClient,
}

impl WallexClient {
    /// Create a client from a configuration snapshot.
    pub fn new(config: Config) -> Self {
        Self {
            rest: RestClient::with_config(config.clone()),
            ws: WsClient::with_config(config.clone()),
            config,
        }
    }

    /// Create a client from `WALLEX_*` environment variables.
    pub fn from_env() -> Result<Self, WallexError> {
        Ok(Self::new(Config::from_env()?))
    }

    /// The configuration snapshot this client was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build a NEW client from a different snapshot.
    ///
    /// Configuration is never mutated in place; existing clients keep the
    /// snapshot they were created with.
    pub fn with_config(&self, config: Config) -> Self {
        Self::new(config)
    }

    /// The underlying REST client.
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// The underlying WebSocket client.
    pub fn ws(&self) -> &WsClient {
        &self.ws
    }

    // Market data.

    /// Get all available markets.
    pub async fn get_markets(&self) -> Result<Markets, WallexError> {
        self.rest.get_markets().await
    }

    /// Get statistics for a single market.
    pub async fn get_market_stats(&self, symbol: &str) -> Result<Market, WallexError> {
        self.rest.get_market_stats(symbol).await
    }

    /// Get the order book for a market.
    pub async fn get_orderbook(&self, symbol: &str) -> Result<Depth, WallexError> {
        self.rest.get_orderbook(symbol).await
    }

    /// Get recent trades for a market.
    pub async fn get_trades(
        &self,
        symbol: &str,
        limit: Option<u32>,
    ) -> Result<RecentTrades, WallexError> {
        self.rest.get_trades(symbol, limit).await
    }

    /// Get the list of supported currencies.
    pub async fn get_currencies(&self) -> Result<serde_json::Value, WallexError> {
        self.rest.get_currencies().await
    }

    // Account (requires credentials).

    /// Get the account profile.
    pub async fn get_profile(&self) -> Result<serde_json::Value, WallexError> {
        self.rest.get_profile().await
    }

    /// Get all asset balances.
    pub async fn get_balances(&self) -> Result<Balances, WallexError> {
        self.rest.get_balances().await
    }

    /// Get the balance for a single asset.
    pub async fn get_balance(&self, asset: &str) -> Result<Balance, WallexError> {
        self.rest.get_balance(asset).await
    }

    /// Create a new order.
    pub async fn create_order(&self, request: &OrderRequest) -> Result<Order, WallexError> {
        self.rest.create_order(request).await
    }

    /// Get open orders, optionally filtered.
    pub async fn get_open_orders(
        &self,
        filter: Option<&OrderFilter>,
    ) -> Result<Orders, WallexError> {
        self.rest.get_open_orders(filter).await
    }

    /// Get one order by ID.
    pub async fn get_order(&self, order_id: &str) -> Result<Order, WallexError> {
        self.rest.get_order(order_id).await
    }

    /// Cancel one order by ID.
    pub async fn cancel_order(&self, order_id: &str) -> Result<Order, WallexError> {
        self.rest.cancel_order(order_id).await
    }

    /// Cancel all open orders, optionally only for one symbol.
    pub async fn cancel_all_orders(
        &self,
        symbol: Option<&str>,
    ) -> Result<serde_json::Value, WallexError> {
        self.rest.cancel_all_orders(symbol).await
    }

    // Streaming.

    /// Connect the WebSocket session.
    pub async fn connect_ws(&self) -> Result<(), WallexError> {
        self.ws.connect().await
    }

    /// Disconnect the WebSocket session. Subscriptions stay registered.
    pub fn disconnect_ws(&self) {
        self.ws.disconnect();
    }

    /// Current WebSocket connection state.
    pub fn ws_state(&self) -> ConnectionState {
        self.ws.state()
    }

    /// Whether the WebSocket session is up.
    pub fn is_ws_connected(&self) -> bool {
        self.ws.is_connected()
    }

    /// Wait until the WebSocket session is up.
    pub async fn wait_ws_connected(&self, timeout: Duration) -> Result<(), WallexError> {
        self.ws.wait_connected(timeout).await
    }

    /// Subscribe to trade updates for a symbol.
    pub fn subscribe_trades(
        &self,
        symbol: &str,
        handler: impl Fn(&str, serde_json::Value) + Send + Sync + 'static,
    ) {
        self.ws.subscribe_trades(symbol, handler);
    }

    /// Subscribe to order book updates for a symbol.
    pub fn subscribe_orderbook(
        &self,
        symbol: &str,
        handler: impl Fn(&str, serde_json::Value) + Send + Sync + 'static,
    ) {
        self.ws.subscribe_orderbook(symbol, handler);
    }

    /// Subscribe to ticker updates for a symbol.
    pub fn subscribe_ticker(
        &self,
        symbol: &str,
        handler: impl Fn(&str, serde_json::Value) + Send + Sync + 'static,
    ) {
        self.ws.subscribe_ticker(symbol, handler);
    }

    /// Subscribe to market cap updates for a symbol.
    pub fn subscribe_market_cap(
        &self,
        symbol: &str,
        handler: impl Fn(&str, serde_json::Value) + Send + Sync + 'static,
    ) {
        self.ws.subscribe_market_cap(symbol, handler);
    }

    /// Unsubscribe from a channel.
    pub fn unsubscribe(&self, channel: &str) {
        self.ws.unsubscribe(channel);
    }

    /// Remove all channel subscriptions.
    pub fn unsubscribe_all(&self) {
        self.ws.clear_subscriptions();
    }
}
