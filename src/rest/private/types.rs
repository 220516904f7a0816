//! Request and response types for the account endpoints.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::error::WallexError;
use crate::rest::Request;
use crate::types::{OrderSide, OrderStatus, OrderType};

/// All asset balances, keyed by asset code.
#[derive(Debug, Clone, Deserialize)]
pub struct Balances {
    /// Balances keyed by asset code (e.g. `BTC`, `TMN`).
    pub balances: HashMap<String, Balance>,
}

/// Balance of a single asset.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    /// Asset code, when echoed by the exchange.
    #[serde(default)]
    pub asset: Option<String>,
    /// Persian display name.
    #[serde(default)]
    pub fa_name: Option<String>,
    /// Whether the asset is a fiat currency.
    #[serde(default)]
    pub fiat: bool,
    /// Total balance, including locked funds.
    #[serde_as(as = "DisplayFromStr")]
    pub value: Decimal,
    /// Funds locked in open orders or pending withdrawals.
    #[serde_as(as = "DisplayFromStr")]
    pub locked: Decimal,
}

impl Balance {
    /// Funds available for trading (total minus locked).
    pub fn available(&self) -> Decimal {
        self.value - self.locked
    }
}

/// Parameters for creating an order.
#[serde_as]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Trading symbol (e.g. `BTCUSDT`).
    pub symbol: String,
    /// Order side.
    pub side: OrderSide,
    /// Order type.
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Order quantity, serialized as a string.
    #[serde_as(as = "DisplayFromStr")]
    pub quantity: Decimal,
    /// Limit price; required for limit orders.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Caller-assigned order ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
}

impl OrderRequest {
    /// Create a limit order request.
    pub fn limit(symbol: impl Into<String>, side: OrderSide, quantity: Decimal, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
            client_order_id: None,
        }
    }

    /// Create a market order request.
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            client_order_id: None,
        }
    }

    /// Set a caller-assigned order ID.
    pub fn client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = Some(id.into());
        self
    }

    /// Check the request before it leaves the process.
    pub(crate) fn validate(&self) -> Result<(), WallexError> {
        if self.symbol.is_empty() {
            return Err(WallexError::Validation("symbol must not be empty".into()));
        }
        if self.quantity <= Decimal::ZERO {
            return Err(WallexError::Validation("quantity must be positive".into()));
        }
        if self.order_type == OrderType::Limit && self.price.is_none() {
            return Err(WallexError::Validation(
                "limit orders require a price".into(),
            ));
        }
        Ok(())
    }
}

/// One order, as reported by the exchange.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Trading symbol.
    pub symbol: String,
    /// Caller-assigned or exchange-assigned order ID.
    #[serde(default)]
    pub client_order_id: Option<String>,
    /// Order side.
    pub side: OrderSide,
    /// Order type.
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Limit price, absent for market orders.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Original order quantity.
    #[serde_as(as = "DisplayFromStr")]
    pub orig_qty: Decimal,
    /// Executed quantity so far.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub executed_qty: Option<Decimal>,
    /// Current order status.
    #[serde(default)]
    pub status: Option<OrderStatus>,
    /// Whether the order is still active.
    #[serde(default)]
    pub active: Option<bool>,
    /// Creation time, as reported by the exchange.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A list of orders.
#[derive(Debug, Clone, Deserialize)]
pub struct Orders {
    /// The orders, newest first.
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Trades executed for the account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountTrades {
    /// The fills, newest first. Raw JSON per entry: fee fields come and go
    /// between exchange releases.
    #[serde(default, alias = "latestTrades")]
    pub trades: Vec<serde_json::Value>,
}

/// Deposit address for one asset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositAddress {
    /// The address to deposit to.
    pub address: String,
    /// Address memo/tag, when the network requires one.
    #[serde(default)]
    pub memo: Option<String>,
    /// Network the address belongs to.
    #[serde(default)]
    pub network: Option<String>,
}

/// Parameters for submitting a withdrawal.
#[serde_as]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    /// Asset code to withdraw.
    pub currency: String,
    /// Amount to withdraw, serialized as a string.
    #[serde_as(as = "DisplayFromStr")]
    pub amount: Decimal,
    /// Destination address.
    pub address: String,
    /// Network to withdraw over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    /// Address memo/tag, when the network requires one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl WithdrawRequest {
    /// Create a withdrawal request.
    pub fn new(currency: impl Into<String>, amount: Decimal, address: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            amount,
            address: address.into(),
            network: None,
            memo: None,
        }
    }

    /// Set the network.
    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Set the memo/tag.
    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// Filter for the open-orders listing.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Restrict to one symbol.
    pub symbol: Option<String>,
    /// Restrict to one status.
    pub status: Option<OrderStatus>,
    /// Maximum number of orders to return.
    pub limit: Option<u32>,
}

impl OrderFilter {
    pub(crate) fn apply(&self, request: Request) -> Request {
        request
            .query_opt("symbol", self.symbol.as_deref())
            .query_opt("status", self.status.map(|s| s.as_str()))
            .query_opt("limit", self.limit)
    }
}

/// Time-bounded filter for the history listings.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Restrict to one symbol.
    pub symbol: Option<String>,
    /// Maximum number of entries to return.
    pub limit: Option<u32>,
    /// Range start (unix milliseconds).
    pub start_time: Option<i64>,
    /// Range end (unix milliseconds).
    pub end_time: Option<i64>,
}

impl HistoryFilter {
    pub(crate) fn apply(&self, request: Request) -> Request {
        request
            .query_opt("symbol", self.symbol.as_deref())
            .query_opt("limit", self.limit)
            .query_opt("startTime", self.start_time)
            .query_opt("endTime", self.end_time)
    }
}

/// Filter for the deposit/withdrawal history listings.
#[derive(Debug, Clone, Default)]
pub struct TransferFilter {
    /// Restrict to one asset.
    pub currency: Option<String>,
    /// Maximum number of entries to return.
    pub limit: Option<u32>,
    /// Range start (unix milliseconds).
    pub start_time: Option<i64>,
    /// Range end (unix milliseconds).
    pub end_time: Option<i64>,
}

impl TransferFilter {
    pub(crate) fn apply(&self, request: Request) -> Request {
        request
            .query_opt("currency", self.currency.as_deref())
            .query_opt("limit", self.limit)
            .query_opt("startTime", self.start_time)
            .query_opt("endTime", self.end_time)
    }
}
