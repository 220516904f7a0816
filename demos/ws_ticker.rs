//! Example: Streaming live ticker and trade updates.
//!
//! Subscriptions are registered before connecting; the client sends them
//! once the connection is up and replays them automatically after any
//! reconnect.
//!
//! Run with: cargo run --example ws_ticker

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use wallex_api_client::ws::WsClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let client = WsClient::new();

    client.on_error(|err| {
        eprintln!("streaming error: {err}");
    });

    client.subscribe_ticker("BTCUSDT", |channel, data| {
        println!("[{channel}] {data}");
    });
    client.subscribe_trades("BTCUSDT", |channel, data| {
        println!("[{channel}] {data}");
    });

    client.connect().await?;
    client.wait_connected(Duration::from_secs(10)).await?;
    println!("connected; streaming for 60 seconds...");

    tokio::time::sleep(Duration::from_secs(60)).await;

    client.disconnect();
    println!("done");
    Ok(())
}
