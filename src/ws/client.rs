//! Public WebSocket client API.

use std::sync::Arc;
use std::time::Duration;

use tokio_stream::wrappers::WatchStream;

use crate::config::Config;
use crate::error::WallexError;
use crate::types::KlineInterval;
use crate::ws::channels;
use crate::ws::connection::{ConnectionState, ErrorObserver, MessageHandler, Shared};

/// Wallex WebSocket client.
///
/// One `WsClient` owns one logical streaming session. Subscriptions are
/// durable across disconnects and reconnects; see the module docs for the
/// lifecycle rules.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use wallex_api_client::ws::WsClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = WsClient::new();
///
///     // Handlers registered before connecting are sent once connected.
///     client.subscribe_trades("BTCUSDT", |channel, data| {
///         println!("{channel}: {data}");
///     });
///
///     client.connect().await?;
///     client.wait_connected(Duration::from_secs(10)).await?;
///
///     tokio::time::sleep(Duration::from_secs(30)).await;
///     client.disconnect();
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct WsClient {
    shared: Arc<Shared>,
}

impl WsClient {
    /// Create a client with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a client from a configuration snapshot.
    pub fn with_config(config: Config) -> Self {
        Self {
            shared: Shared::new(config),
        }
    }

    /// The configuration snapshot this client was built from.
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Connect to the streaming endpoint.
    ///
    /// Registered subscriptions are replayed once the connection is up. A
    /// no-op when already connected or connecting. Handshake failures are
    /// classified and returned; once a session has been established, drops
    /// are handled by the configured reconnect policy instead.
    pub async fn connect(&self) -> Result<(), WallexError> {
        self.shared.clone().connect().await
    }

    /// Tear down the session.
    ///
    /// Idempotent and safe to call from any state; unblocks an in-progress
    /// reconnect wait. Subscriptions stay registered so a later
    /// [`WsClient::connect`] restores them; use
    /// [`WsClient::clear_subscriptions`] to drop them.
    pub fn disconnect(&self) {
        self.shared.disconnect();
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Whether the connection is currently up.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Block until the connection is up, or fail with [`WallexError::Timeout`].
    pub async fn wait_connected(&self, timeout: Duration) -> Result<(), WallexError> {
        self.shared.wait_connected(timeout).await
    }

    /// Stream of connection state changes.
    pub fn state_stream(&self) -> WatchStream<ConnectionState> {
        WatchStream::new(self.shared.state_watch())
    }

    /// Register an observer for errors with no direct caller: protocol
    /// error frames and terminal reconnect failures.
    pub fn on_error(&self, observer: impl Fn(WallexError) + Send + Sync + 'static) {
        let observer: ErrorObserver = Arc::new(observer);
        self.shared.set_error_observer(observer);
    }

    /// Subscribe to a channel with a message handler.
    ///
    /// Registering an already-subscribed channel replaces its handler. When
    /// connected the subscribe frame is emitted immediately; otherwise the
    /// entry is stored and emitted on the next connected transition.
    pub fn subscribe(
        &self,
        channel: impl Into<String>,
        handler: impl Fn(&str, serde_json::Value) + Send + Sync + 'static,
    ) {
        let handler: MessageHandler = Arc::new(handler);
        self.shared.subscribe(channel.into(), handler);
    }

    /// Unsubscribe from a channel. No-op when the key was never registered.
    pub fn unsubscribe(&self, channel: &str) {
        self.shared.unsubscribe(channel);
    }

    /// Unsubscribe from every channel of one symbol.
    pub fn unsubscribe_symbol(&self, symbol: &str) {
        self.shared.unsubscribe_symbol(symbol);
    }

    /// Remove all registry entries.
    pub fn clear_subscriptions(&self) {
        self.shared.clear_subscriptions();
    }

    /// Channels currently registered, in registry order.
    pub fn subscriptions(&self) -> Vec<String> {
        self.shared.subscriptions()
    }

    /// Whether a channel is registered.
    pub fn is_subscribed(&self, channel: &str) -> bool {
        self.shared.is_subscribed(channel)
    }

    /// Subscribe to trade updates for a symbol.
    pub fn subscribe_trades(
        &self,
        symbol: &str,
        handler: impl Fn(&str, serde_json::Value) + Send + Sync + 'static,
    ) {
        self.subscribe(channels::trade(symbol), handler);
    }

    /// Subscribe to order book updates for a symbol.
    ///
    /// Registers both the buy and the sell depth channels with the same
    /// handler; the channel argument tells the sides apart.
    pub fn subscribe_orderbook(
        &self,
        symbol: &str,
        handler: impl Fn(&str, serde_json::Value) + Send + Sync + 'static,
    ) {
        let handler: MessageHandler = Arc::new(handler);
        self.shared
            .subscribe(channels::buy_depth(symbol), handler.clone());
        self.shared.subscribe(channels::sell_depth(symbol), handler);
    }

    /// Subscribe to ticker updates for a symbol.
    pub fn subscribe_ticker(
        &self,
        symbol: &str,
        handler: impl Fn(&str, serde_json::Value) + Send + Sync + 'static,
    ) {
        self.subscribe(channels::ticker(symbol), handler);
    }

    /// Subscribe to market cap updates for a symbol.
    pub fn subscribe_market_cap(
        &self,
        symbol: &str,
        handler: impl Fn(&str, serde_json::Value) + Send + Sync + 'static,
    ) {
        self.subscribe(channels::market_cap(symbol), handler);
    }

    /// Subscribe to candlestick updates for a symbol and interval.
    pub fn subscribe_kline(
        &self,
        symbol: &str,
        interval: KlineInterval,
        handler: impl Fn(&str, serde_json::Value) + Send + Sync + 'static,
    ) {
        self.subscribe(channels::kline(symbol, interval), handler);
    }

    /// Subscribe to ticker updates for all symbols.
    pub fn subscribe_all_tickers(
        &self,
        handler: impl Fn(&str, serde_json::Value) + Send + Sync + 'static,
    ) {
        self.subscribe(channels::all_tickers(), handler);
    }

    /// Subscribe to market cap updates for all symbols.
    pub fn subscribe_all_market_caps(
        &self,
        handler: impl Fn(&str, serde_json::Value) + Send + Sync + 'static,
    ) {
        self.subscribe(channels::all_market_caps(), handler);
    }
}

impl Default for WsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsClient")
            .field("ws_url", &self.shared.config.ws_url.as_str())
            .field("state", &self.state())
            .field("subscriptions", &self.subscriptions().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convenience_subscriptions_register_channels() {
        let client = WsClient::new();

        client.subscribe_trades("BTCUSDT", |_, _| {});
        client.subscribe_orderbook("BTCUSDT", |_, _| {});
        client.subscribe_kline("ETHUSDT", KlineInterval::Min5, |_, _| {});

        assert!(client.is_subscribed("BTCUSDT@trade"));
        assert!(client.is_subscribed("BTCUSDT@buyDepth"));
        assert!(client.is_subscribed("BTCUSDT@sellDepth"));
        assert!(client.is_subscribed("ETHUSDT@kline_5m"));

        client.unsubscribe_symbol("BTCUSDT");
        assert_eq!(client.subscriptions(), vec!["ETHUSDT@kline_5m".to_string()]);
    }

    #[test]
    fn test_initial_state_disconnected() {
        let client = WsClient::new();
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(!client.is_connected());
    }
}
