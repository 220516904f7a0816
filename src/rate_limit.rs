//! Client-side request rate limiting.
//!
//! Wallex allows a fixed number of REST requests per minute. The request
//! pipeline takes a permit from this quota before each call so bursts are
//! smoothed out before they reach the exchange; server-side 429 responses
//! remain authoritative and are handled by the retry policy.

use std::num::NonZeroU32;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

/// A per-minute request quota shared by all calls on one client.
pub struct RequestQuota {
    limiter: DefaultDirectRateLimiter,
}

impl RequestQuota {
    /// Create a quota allowing `per_minute` requests per minute.
    pub fn per_minute(per_minute: NonZeroU32) -> Self {
        Self {
            limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
        }
    }

    /// Wait until a permit is available.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Take a permit without waiting. Returns false when exhausted.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for RequestQuota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestQuota").finish_non_exhaustive()
    }
}
