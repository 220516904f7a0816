//! Wallex REST API client.
//!
//! [`RestClient`] executes one logical API call reliably: it builds the
//! request, signs it when credentials are required, retries transient
//! failures with exponential backoff, and translates every outcome into a
//! typed payload or a single [`crate::WallexError`].

mod client;
pub mod endpoints;
pub mod private;
pub mod public;

pub use client::{Request, RestClient, RestClientBuilder};
