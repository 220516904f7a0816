//! # Wallex Client
//!
//! An async Rust client library for the Wallex exchange REST and WebSocket
//! APIs.
//!
//! ## Features
//!
//! - Full REST API support with signed private endpoints
//! - Retry with exponential backoff and error classification
//! - WebSocket streaming with automatic reconnection and durable
//!   subscriptions
//! - Built-in client-side rate limiting
//! - Financial precision with `rust_decimal`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wallex_api_client::rest::RestClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RestClient::new();
//!     let markets = client.get_markets().await?;
//!     println!("{} markets available", markets.symbols.len());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod portfolio;
pub mod rate_limit;
pub mod rest;
pub mod types;
pub mod ws;

// Re-export commonly used types at crate root
pub use client::WallexClient;
pub use config::{Config, ConfigBuilder, ReconnectPolicy};
pub use error::{ApiError, WallexError};
pub use types::{OrderSide, OrderStatus, OrderType};

/// Result type alias using WallexError
pub type Result<T> = std::result::Result<T, WallexError>;
