//! Authentication module for the Wallex API.
//!
//! This module provides:
//! - Credential management with secure secret storage
//! - Strictly increasing request timestamps for replay protection
//! - HMAC-SHA256 signature generation for authenticated requests

mod credentials;
mod signature;
mod timestamp;

pub use credentials::Credentials;
pub use signature::{canonical_string, sign_request};
pub use timestamp::{IncreasingTimestamp, TimestampProvider};
