//! Wallex streaming channel names.
//!
//! A channel identifies one data category for one symbol, e.g.
//! `BTCUSDT@trade`. The constructors here are the single source of channel
//! keys for both subscribing and registry bookkeeping.

use crate::types::KlineInterval;

/// Trades channel for a symbol.
pub fn trade(symbol: &str) -> String {
    format!("{symbol}@trade")
}

/// Buy-side depth channel for a symbol.
pub fn buy_depth(symbol: &str) -> String {
    format!("{symbol}@buyDepth")
}

/// Sell-side depth channel for a symbol.
pub fn sell_depth(symbol: &str) -> String {
    format!("{symbol}@sellDepth")
}

/// Ticker channel for a symbol.
pub fn ticker(symbol: &str) -> String {
    format!("{symbol}@ticker")
}

/// Market cap channel for a symbol.
pub fn market_cap(symbol: &str) -> String {
    format!("{symbol}@marketCap")
}

/// Candlestick channel for a symbol and interval.
pub fn kline(symbol: &str, interval: KlineInterval) -> String {
    format!("{symbol}@kline_{interval}")
}

/// Combined ticker channel covering all symbols.
pub fn all_tickers() -> String {
    "!ticker@arr".to_string()
}

/// Combined market cap channel covering all symbols.
pub fn all_market_caps() -> String {
    "!marketCap@arr".to_string()
}

/// Prefix matching all channels of one symbol.
pub(crate) fn symbol_prefix(symbol: &str) -> String {
    format!("{symbol}@")
}
