//! Account endpoints (authentication required).
//!
//! Every method here fails with [`crate::WallexError::Auth`] before any
//! network I/O when the configuration snapshot carries no credentials.

mod types;

pub use types::*;

use crate::error::WallexError;
use crate::rest::endpoints::account;
use crate::rest::{Request, RestClient};

impl RestClient {
    /// Get the account profile.
    ///
    /// Profile payloads carry KYC and contact details whose shape is not
    /// load-bearing for this client, so they are returned as raw JSON.
    pub async fn get_profile(&self) -> Result<serde_json::Value, WallexError> {
        self.execute(Request::get(account::PROFILE).authenticated())
            .await
    }

    /// Get all asset balances.
    pub async fn get_balances(&self) -> Result<Balances, WallexError> {
        self.execute(Request::get(account::BALANCES).authenticated())
            .await
    }

    /// Get the balance for a single asset.
    pub async fn get_balance(&self, asset: &str) -> Result<Balance, WallexError> {
        self.execute(Request::get(account::balance(asset)).authenticated())
            .await
    }

    /// Create a new order.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use wallex_api_client::rest::RestClient;
    /// use wallex_api_client::rest::private::OrderRequest;
    /// use wallex_api_client::types::OrderSide;
    /// use wallex_api_client::Config;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = RestClient::with_config(Config::from_env()?);
    ///     let request = OrderRequest::limit("BTCUSDT", OrderSide::Buy, "0.001".parse()?, "43000".parse()?);
    ///     let order = client.create_order(&request).await?;
    ///     println!("order accepted: {:?}", order.client_order_id);
    ///     Ok(())
    /// }
    /// ```
    pub async fn create_order(&self, request: &OrderRequest) -> Result<Order, WallexError> {
        request.validate()?;
        self.execute(Request::post(account::ORDERS).json(request)?.authenticated())
            .await
    }

    /// Get open orders, optionally filtered.
    pub async fn get_open_orders(
        &self,
        filter: Option<&OrderFilter>,
    ) -> Result<Orders, WallexError> {
        let mut request = Request::get(account::ORDERS);
        if let Some(filter) = filter {
            request = filter.apply(request);
        }
        self.execute(request.authenticated()).await
    }

    /// Get one order by ID.
    pub async fn get_order(&self, order_id: &str) -> Result<Order, WallexError> {
        self.execute(Request::get(account::order(order_id)).authenticated())
            .await
    }

    /// Cancel one order by ID.
    pub async fn cancel_order(&self, order_id: &str) -> Result<Order, WallexError> {
        self.execute(Request::delete(account::order(order_id)).authenticated())
            .await
    }

    /// Cancel all open orders, optionally only for one symbol.
    ///
    /// The cancellation report shape varies with the number of affected
    /// orders, so it is returned as raw JSON.
    pub async fn cancel_all_orders(
        &self,
        symbol: Option<&str>,
    ) -> Result<serde_json::Value, WallexError> {
        self.execute(
            Request::delete(account::ORDERS)
                .query_opt("symbol", symbol)
                .authenticated(),
        )
        .await
    }

    /// Get order history, optionally filtered.
    pub async fn get_order_history(
        &self,
        filter: Option<&HistoryFilter>,
    ) -> Result<Orders, WallexError> {
        let mut request = Request::get(account::ORDER_HISTORY);
        if let Some(filter) = filter {
            request = filter.apply(request);
        }
        self.execute(request.authenticated()).await
    }

    /// Get trade history, optionally filtered.
    pub async fn get_trade_history(
        &self,
        filter: Option<&HistoryFilter>,
    ) -> Result<AccountTrades, WallexError> {
        let mut request = Request::get(account::TRADE_HISTORY);
        if let Some(filter) = filter {
            request = filter.apply(request);
        }
        self.execute(request.authenticated()).await
    }

    /// Get the deposit address for an asset.
    pub async fn get_deposit_address(
        &self,
        asset: &str,
        network: Option<&str>,
    ) -> Result<DepositAddress, WallexError> {
        self.execute(
            Request::get(account::DEPOSIT_ADDRESS)
                .query("currency", asset)
                .query_opt("network", network)
                .authenticated(),
        )
        .await
    }

    /// Get deposit history, optionally filtered.
    pub async fn get_deposit_history(
        &self,
        filter: Option<&TransferFilter>,
    ) -> Result<serde_json::Value, WallexError> {
        let mut request = Request::get(account::DEPOSITS);
        if let Some(filter) = filter {
            request = filter.apply(request);
        }
        self.execute(request.authenticated()).await
    }

    /// Submit a withdrawal.
    pub async fn withdraw(
        &self,
        request: &WithdrawRequest,
    ) -> Result<serde_json::Value, WallexError> {
        self.execute(
            Request::post(account::WITHDRAW)
                .json(request)?
                .authenticated(),
        )
        .await
    }

    /// Get withdrawal history, optionally filtered.
    pub async fn get_withdrawal_history(
        &self,
        filter: Option<&TransferFilter>,
    ) -> Result<serde_json::Value, WallexError> {
        let mut request = Request::get(account::WITHDRAWALS);
        if let Some(filter) = filter {
            request = filter.apply(request);
        }
        self.execute(request.authenticated()).await
    }
}
