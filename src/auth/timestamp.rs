//! Request timestamps for Wallex API authentication.
//!
//! Each signed request carries a millisecond timestamp that is used exactly
//! once; a strictly increasing sequence prevents two concurrent calls from
//! colliding inside the exchange's replay window.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Trait for providing request timestamps.
///
/// The value must be strictly increasing across calls on one provider.
/// A custom implementation can pin timestamps for tests.
pub trait TimestampProvider: Send + Sync {
    /// Generate the next timestamp, in milliseconds since UNIX epoch.
    ///
    /// This value must be greater than any previously returned value.
    fn next_timestamp(&self) -> u64;
}

/// A timestamp provider backed by the system clock.
///
/// Uses milliseconds since UNIX epoch, with an atomic counter to ensure
/// strict monotonicity even for requests made in the same millisecond.
pub struct IncreasingTimestamp {
    last: AtomicU64,
}

impl IncreasingTimestamp {
    /// Create a new increasing timestamp provider.
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    fn current_time_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

impl Default for IncreasingTimestamp {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampProvider for IncreasingTimestamp {
    fn next_timestamp(&self) -> u64 {
        let now = Self::current_time_millis();

        // Take the max of wall-clock time and last + 1.
        loop {
            let last = self.last.load(Ordering::SeqCst);
            let next = now.max(last + 1);

            if self
                .last
                .compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return next;
            }
            // Another thread advanced the value. Retry.
        }
    }
}
