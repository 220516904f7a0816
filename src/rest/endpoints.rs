//! Wallex REST API endpoint constants.

/// Market data endpoints (no authentication required).
pub mod market {
    /// List all markets.
    pub const MARKETS: &str = "/v1/markets";
    /// Order book depth for one market.
    pub const DEPTH: &str = "/v1/depth";
    /// Recent trades for one market.
    pub const TRADES: &str = "/v1/trades";
    /// Candlestick history (TradingView UDF format).
    pub const UDF_HISTORY: &str = "/v1/udf/history";
    /// List supported currencies.
    pub const CURRENCIES: &str = "/v1/currencies";

    /// Statistics for a single market.
    pub fn stats(symbol: &str) -> String {
        format!("{MARKETS}/{symbol}")
    }
}

/// Account endpoints (authentication required).
pub mod account {
    /// Account profile.
    pub const PROFILE: &str = "/v1/account/profile";
    /// All asset balances.
    pub const BALANCES: &str = "/v1/account/balances";
    /// Open orders; also order creation and bulk cancellation.
    pub const ORDERS: &str = "/v1/account/orders";
    /// Order history.
    pub const ORDER_HISTORY: &str = "/v1/account/orders/history";
    /// Trade history.
    pub const TRADE_HISTORY: &str = "/v1/account/trades";
    /// Deposit address lookup.
    pub const DEPOSIT_ADDRESS: &str = "/v1/account/deposit/address";
    /// Deposit history.
    pub const DEPOSITS: &str = "/v1/account/deposits";
    /// Withdrawal submission.
    pub const WITHDRAW: &str = "/v1/account/withdraw";
    /// Withdrawal history.
    pub const WITHDRAWALS: &str = "/v1/account/withdrawals";

    /// Balance for a single asset.
    pub fn balance(asset: &str) -> String {
        format!("{BALANCES}/{asset}")
    }

    /// A single order by ID.
    pub fn order(order_id: &str) -> String {
        format!("{ORDERS}/{order_id}")
    }
}
