//! Response types for the market data endpoints.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::types::OrderSide;

/// All markets, keyed by symbol.
#[derive(Debug, Clone, Deserialize)]
pub struct Markets {
    /// Market definitions keyed by symbol (e.g. `BTCUSDT`).
    pub symbols: HashMap<String, Market>,
}

/// One tradable market.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    /// Trading symbol (e.g. `BTCUSDT`).
    pub symbol: String,
    /// Base asset code.
    pub base_asset: String,
    /// Base asset precision (decimal places).
    #[serde(default)]
    pub base_asset_precision: u32,
    /// Quote asset code.
    pub quote_asset: String,
    /// Quote asset precision (decimal places).
    #[serde(default)]
    pub quote_precision: u32,
    /// Persian display name.
    #[serde(default)]
    pub fa_name: Option<String>,
    /// Quantity step size (decimal places).
    #[serde(default)]
    pub step_size: u32,
    /// Price tick size (decimal places).
    #[serde(default)]
    pub tick_size: u32,
    /// Minimum order quantity.
    #[serde(default)]
    pub min_qty: Option<f64>,
    /// Minimum order notional value.
    #[serde(default)]
    pub min_notional: Option<f64>,
    /// Rolling market statistics.
    pub stats: MarketStats,
    /// Listing time, as reported by the exchange.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Rolling statistics for one market.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStats {
    /// Best bid price.
    #[serde_as(as = "DisplayFromStr")]
    pub bid_price: Decimal,
    /// Best ask price.
    #[serde_as(as = "DisplayFromStr")]
    pub ask_price: Decimal,
    /// Last traded price.
    #[serde_as(as = "DisplayFromStr")]
    pub last_price: Decimal,
    /// Last traded quantity.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub last_qty: Option<Decimal>,
    /// Side of the last trade.
    #[serde(default)]
    pub last_trade_side: Option<OrderSide>,
    /// Total bid volume.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub bid_volume: Option<Decimal>,
    /// Total ask volume.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub ask_volume: Option<Decimal>,
    /// Number of open bids.
    #[serde(default)]
    pub bid_count: Option<u64>,
    /// Number of open asks.
    #[serde(default)]
    pub ask_count: Option<u64>,
    /// 24h price direction, percentage of buys/sells.
    #[serde(default)]
    pub direction: Option<HashMap<String, i64>>,
}

/// One price level of an order book side.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct PriceLevel {
    /// Level price.
    #[serde_as(as = "DisplayFromStr")]
    pub price: Decimal,
    /// Quantity resting at this level.
    #[serde_as(as = "DisplayFromStr")]
    pub quantity: Decimal,
    /// Cumulative notional up to this level, when reported.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub sum: Option<Decimal>,
}

/// Order book snapshot for one market.
#[derive(Debug, Clone, Deserialize)]
pub struct Depth {
    /// Ask side, best price first.
    #[serde(default)]
    pub ask: Vec<PriceLevel>,
    /// Bid side, best price first.
    #[serde(default)]
    pub bid: Vec<PriceLevel>,
}

impl Depth {
    /// Best-ask minus best-bid, when both sides are populated.
    pub fn spread(&self) -> Option<Decimal> {
        let best_ask = self.ask.first()?.price;
        let best_bid = self.bid.first()?.price;
        Some(best_ask - best_bid)
    }

    /// Midpoint between best bid and best ask.
    pub fn mid_price(&self) -> Option<Decimal> {
        let best_ask = self.ask.first()?.price;
        let best_bid = self.bid.first()?.price;
        Some((best_ask + best_bid) / Decimal::TWO)
    }
}

/// One public trade.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTrade {
    /// Trading symbol, when echoed by the exchange.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Trade price.
    #[serde_as(as = "DisplayFromStr")]
    pub price: Decimal,
    /// Trade quantity.
    #[serde_as(as = "DisplayFromStr")]
    pub quantity: Decimal,
    /// Trade notional value.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub sum: Option<Decimal>,
    /// True when the aggressor was a buy order.
    #[serde(default)]
    pub is_buy_order: bool,
    /// Exchange timestamp, as reported.
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Recent trades for one market.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTrades {
    /// Most recent trades, newest first.
    #[serde(default)]
    pub latest_trades: Vec<MarketTrade>,
}

/// Candlestick history in the TradingView UDF column format.
///
/// Columns are index-aligned: entry *i* of each vector describes candle *i*.
#[derive(Debug, Clone, Deserialize)]
pub struct CandleHistory {
    /// Feed status (`"ok"` or `"no_data"`).
    #[serde(rename = "s")]
    pub status: String,
    /// Candle open times (unix seconds).
    #[serde(rename = "t", default)]
    pub times: Vec<i64>,
    /// Open prices.
    #[serde(rename = "o", default)]
    pub opens: Vec<f64>,
    /// High prices.
    #[serde(rename = "h", default)]
    pub highs: Vec<f64>,
    /// Low prices.
    #[serde(rename = "l", default)]
    pub lows: Vec<f64>,
    /// Close prices.
    #[serde(rename = "c", default)]
    pub closes: Vec<f64>,
    /// Volumes.
    #[serde(rename = "v", default)]
    pub volumes: Vec<f64>,
}

impl CandleHistory {
    /// Number of candles in the response.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the response contains no candles.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_deserializes() {
        let json = serde_json::json!({
            "symbol": "BTCUSDT",
            "baseAsset": "BTC",
            "quoteAsset": "USDT",
            "faName": "بیت کوین - تتر",
            "stepSize": 6,
            "tickSize": 2,
            "stats": {
                "bidPrice": "43000.12",
                "askPrice": "43010.55",
                "lastPrice": "43005.00",
                "lastQty": "0.013",
                "bidCount": 41,
                "askCount": 36
            }
        });

        let market: Market = serde_json::from_value(json).unwrap();
        assert_eq!(market.symbol, "BTCUSDT");
        assert_eq!(market.stats.last_price, "43005.00".parse().unwrap());
        assert_eq!(market.stats.bid_count, Some(41));
    }

    #[test]
    fn test_depth_spread_and_mid() {
        let json = serde_json::json!({
            "ask": [{"price": "101", "quantity": "1"}],
            "bid": [{"price": "99", "quantity": "2"}]
        });

        let depth: Depth = serde_json::from_value(json).unwrap();
        assert_eq!(depth.spread().unwrap(), Decimal::TWO);
        assert_eq!(depth.mid_price().unwrap(), Decimal::from(100));
    }

    #[test]
    fn test_empty_depth_has_no_spread() {
        let depth: Depth = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(depth.spread().is_none());
        assert!(depth.mid_price().is_none());
    }

    #[test]
    fn test_candle_history_columns() {
        let json = serde_json::json!({
            "s": "ok",
            "t": [1700000000, 1700003600],
            "o": [42000.0, 42100.0],
            "h": [42500.0, 42400.0],
            "l": [41900.0, 42050.0],
            "c": [42100.0, 42300.0],
            "v": [10.5, 8.2]
        });

        let history: CandleHistory = serde_json::from_value(json).unwrap();
        assert_eq!(history.status, "ok");
        assert_eq!(history.len(), 2);
        assert!(!history.is_empty());
    }
}
