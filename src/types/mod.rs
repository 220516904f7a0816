//! Shared types used across the REST and WebSocket APIs.

mod common;

pub use common::*;
