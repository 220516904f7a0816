//! Portfolio snapshot boundary.
//!
//! The crate does not persist anything itself; it produces plain snapshot
//! values from balance responses and hands them to a [`SnapshotSink`]
//! implemented by the application (a database, a file, anything).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::WallexError;
use crate::rest::private::Balances;

/// Balance of one asset at snapshot time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetBalance {
    /// Asset code (e.g. `BTC`).
    pub asset: String,
    /// Persian display name, when known.
    pub fa_name: Option<String>,
    /// Total balance, including locked funds.
    pub total: Decimal,
    /// Funds available for trading.
    pub available: Decimal,
    /// Funds locked in open orders or pending withdrawals.
    pub locked: Decimal,
    /// USD valuation, when the caller priced the asset.
    pub usd_value: Option<Decimal>,
}

/// One account snapshot: date, totals and per-asset balances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    /// Snapshot date key (`YYYY-MM-DD`); one snapshot per day.
    pub date: String,
    /// Exact time the snapshot was taken.
    #[serde(with = "time::serde::rfc3339")]
    pub taken_at: OffsetDateTime,
    /// Total value in the local quote currency, when priced.
    pub total_tmn_value: Option<Decimal>,
    /// Total value in USD, when priced.
    pub total_usd_value: Option<Decimal>,
    /// Number of assets the account reported.
    pub total_assets: usize,
    /// Number of assets with a non-zero balance.
    pub assets_with_balance: usize,
    /// Non-zero balances.
    pub assets: Vec<AssetBalance>,
}

impl PortfolioSnapshot {
    /// Build a snapshot from a balances response.
    ///
    /// Zero balances are counted but not materialized. Valuations are a
    /// pricing concern and stay `None` until set with
    /// [`PortfolioSnapshot::with_totals`].
    pub fn from_balances(
        date: impl Into<String>,
        taken_at: OffsetDateTime,
        balances: &Balances,
    ) -> Self {
        let mut assets: Vec<AssetBalance> = balances
            .balances
            .iter()
            .filter(|(_, balance)| balance.value > Decimal::ZERO)
            .map(|(asset, balance)| AssetBalance {
                asset: asset.clone(),
                fa_name: balance.fa_name.clone(),
                total: balance.value,
                available: balance.available(),
                locked: balance.locked,
                usd_value: None,
            })
            .collect();
        assets.sort_by(|a, b| a.asset.cmp(&b.asset));

        Self {
            date: date.into(),
            taken_at,
            total_tmn_value: None,
            total_usd_value: None,
            total_assets: balances.balances.len(),
            assets_with_balance: assets.len(),
            assets,
        }
    }

    /// Attach portfolio totals computed by the caller.
    pub fn with_totals(mut self, total_tmn: Decimal, total_usd: Decimal) -> Self {
        self.total_tmn_value = Some(total_tmn);
        self.total_usd_value = Some(total_usd);
        self
    }
}

/// Persistence boundary for portfolio snapshots.
///
/// Implementations store one snapshot and return its storage ID. The crate
/// treats the sink as a black box; correctness of the store is the
/// application's concern.
pub trait SnapshotSink {
    /// Store a snapshot, returning its storage ID.
    fn store(&self, snapshot: &PortfolioSnapshot) -> Result<i64, WallexError>;
}
