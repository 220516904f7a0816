//! Wallex WebSocket streaming client.
//!
//! [`WsClient`] maintains one logical streaming session. Channel
//! subscriptions are durable: they live in a registry that survives
//! disconnects, and every transition into the connected state replays them
//! over the fresh transport. Inbound messages are dispatched to registered
//! handlers off the read path, so a slow or panicking handler can never
//! stall the connection.

pub mod channels;
mod client;
mod connection;
pub mod messages;

pub use client::WsClient;
pub use connection::{ConnectionState, ErrorObserver, MessageHandler};
