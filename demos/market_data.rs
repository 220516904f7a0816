//! Example: Fetching public market data from Wallex.
//!
//! This example demonstrates how to use the Wallex REST API to fetch
//! publicly available market data without authentication.
//!
//! Run with: cargo run --example market_data

use wallex_api_client::rest::RestClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create a client for public endpoints (no credentials needed)
    let client = RestClient::new();

    // List markets
    println!("=== Markets ===");
    let markets = client.get_markets().await?;
    println!("{} markets available", markets.symbols.len());
    for (symbol, market) in markets.symbols.iter().take(5) {
        println!(
            "{}: last={} bid={} ask={}",
            symbol, market.stats.last_price, market.stats.bid_price, market.stats.ask_price
        );
    }

    // Order book for one market
    println!("\n=== Order Book (BTCUSDT) ===");
    let depth = client.get_orderbook("BTCUSDT").await?;
    println!("Asks (lowest first):");
    for level in depth.ask.iter().take(3) {
        println!("  {} @ {}", level.quantity, level.price);
    }
    println!("Bids (highest first):");
    for level in depth.bid.iter().take(3) {
        println!("  {} @ {}", level.quantity, level.price);
    }
    if let Some(spread) = depth.spread() {
        println!("Spread: {spread}");
    }

    // Recent trades
    println!("\n=== Recent Trades (BTCUSDT) ===");
    let trades = client.get_trades("BTCUSDT", Some(5)).await?;
    for trade in &trades.latest_trades {
        let side = if trade.is_buy_order { "buy" } else { "sell" };
        println!("  {side} {} @ {}", trade.quantity, trade.price);
    }

    // Hourly candles
    println!("\n=== Candles (BTCUSDT, 1h) ===");
    let candles = client.get_klines("BTCUSDT", "60", None, None).await?;
    println!("status={} candles={}", candles.status, candles.len());
    for i in (0..candles.len()).rev().take(3) {
        println!(
            "  t={} o={} h={} l={} c={}",
            candles.times[i], candles.opens[i], candles.highs[i], candles.lows[i], candles.closes[i]
        );
    }

    Ok(())
}
