//! Market data endpoints (no authentication required).

mod types;

pub use types::*;

use crate::error::WallexError;
use crate::rest::endpoints::market;
use crate::rest::{Request, RestClient};

impl RestClient {
    /// Get all available markets and their statistics.
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
    ///     if let Some(btc) = markets.symbols.get("BTCUSDT") {
    ///         println!("BTC/USDT last price: {}", btc.stats.last_price);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn get_markets(&self) -> Result<Markets, WallexError> {
        self.execute(Request::get(market::MARKETS)).await
    }

    /// Get statistics for a single market.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Trading symbol (e.g. `BTCUSDT`).
    pub async fn get_market_stats(&self, symbol: &str) -> Result<Market, WallexError> {
        self.execute(Request::get(market::stats(symbol))).await
    }

    /// Get the order book for a market.
    pub async fn get_orderbook(&self, symbol: &str) -> Result<Depth, WallexError> {
        self.execute(Request::get(market::DEPTH).query("symbol", symbol))
            .await
    }

    /// Get recent trades for a market.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Trading symbol.
    /// * `limit` - Maximum number of trades to return.
    pub async fn get_trades(
        &self,
        symbol: &str,
        limit: Option<u32>,
    ) -> Result<RecentTrades, WallexError> {
        self.execute(
            Request::get(market::TRADES)
                .query("symbol", symbol)
                .query_opt("limit", limit),
        )
        .await
    }

    /// Get candlestick history in the TradingView UDF column format.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Trading symbol.
    /// * `resolution` - Chart resolution (e.g. `"60"`, `"1D"`).
    /// * `from_time` / `to_time` - Unix second range bounds.
    pub async fn get_klines(
        &self,
        symbol: &str,
        resolution: &str,
        from_time: Option<i64>,
        to_time: Option<i64>,
    ) -> Result<CandleHistory, WallexError> {
        self.execute(
            Request::get(market::UDF_HISTORY)
                .query("symbol", symbol)
                .query("resolution", resolution)
                .query_opt("from", from_time)
                .query_opt("to", to_time),
        )
        .await
    }

    /// Get the list of supported currencies.
    ///
    /// The shape of this payload varies between exchange releases, so it is
    /// returned as raw JSON.
    pub async fn get_currencies(&self) -> Result<serde_json::Value, WallexError> {
        self.execute(Request::get(market::CURRENCIES)).await
    }
}
