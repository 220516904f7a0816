//! Example: Reading account balances over the authenticated REST API.
//!
//! Requires `WALLEX_API_KEY` and `WALLEX_API_SECRET` in the environment or
//! in a `.env` file.
//!
//! Run with: cargo run --example account_balances

use rust_decimal::Decimal;
use wallex_api_client::rest::RestClient;
use wallex_api_client::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    let client = RestClient::with_config(config);

    let balances = client.get_balances().await?;
    println!("{} assets on the account", balances.balances.len());

    let mut with_funds: Vec<_> = balances
        .balances
        .iter()
        .filter(|(_, b)| b.value > Decimal::ZERO)
        .collect();
    with_funds.sort_by(|a, b| a.0.cmp(b.0));

    println!("\nAsset      Total            Available        Locked");
    for (asset, balance) in with_funds {
        println!(
            "{asset:<10} {:<16} {:<16} {}",
            balance.value,
            balance.available(),
            balance.locked
        );
    }

    Ok(())
}
