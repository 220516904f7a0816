//! Example: Taking a daily portfolio snapshot and handing it to a sink.
//!
//! The library builds the snapshot value; persistence is the application's
//! concern. Here the sink appends JSON lines to a local file.
//!
//! Requires `WALLEX_API_KEY` and `WALLEX_API_SECRET` in the environment or
//! in a `.env` file.
//!
//! Run with: cargo run --example portfolio_snapshot

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use time::OffsetDateTime;
use wallex_api_client::portfolio::{PortfolioSnapshot, SnapshotSink};
use wallex_api_client::rest::RestClient;
use wallex_api_client::{Config, WallexError};

/// Append-only JSON-lines sink.
struct JsonFileSink {
    path: PathBuf,
    stored: Mutex<i64>,
}

impl JsonFileSink {
    fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stored: Mutex::new(0),
        }
    }
}

impl SnapshotSink for JsonFileSink {
    fn store(&self, snapshot: &PortfolioSnapshot) -> Result<i64, WallexError> {
        let line = serde_json::to_string(snapshot)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| WallexError::Unknown(format!("cannot open sink file: {e}")))?;
        writeln!(file, "{line}").map_err(|e| WallexError::Unknown(e.to_string()))?;

        let mut stored = self.stored.lock().expect("sink counter poisoned");
        *stored += 1;
        Ok(*stored)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let client = RestClient::with_config(Config::from_env()?);
    let balances = client.get_balances().await?;

    let now = OffsetDateTime::now_utc();
    let date = format!("{:04}-{:02}-{:02}", now.year(), now.month() as u8, now.day());
    let snapshot = PortfolioSnapshot::from_balances(date, now, &balances);

    println!(
        "snapshot {}: {} assets, {} with balance",
        snapshot.date, snapshot.total_assets, snapshot.assets_with_balance
    );
    for asset in &snapshot.assets {
        println!("  {:<8} total={} locked={}", asset.asset, asset.total, asset.locked);
    }

    let sink = JsonFileSink::new("portfolio_snapshots.jsonl");
    let id = sink.store(&snapshot)?;
    println!("stored as snapshot #{id}");

    Ok(())
}
