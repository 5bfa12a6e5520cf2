//! Request quota shared by all calls to one platform

use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::Quota;

use crate::config::RateLimitConfig;

/// Slowest refill rate a limiter is built with, in calls per second
pub const MIN_CALLS_PER_SECOND: f64 = 0.001;

/// `burst` calls may go out at once, then one more every `1 / per_second`
///
/// Callers take a slot with [`acquire`](Self::acquire) before starting the
/// timed part of a platform call, so queueing here never eats into the
/// call timeout.
pub struct RateLimiter {
    burst: u32,
    per_second: f64,
    limiter: governor::RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl RateLimiter {
    pub fn new(burst: u32, per_second: f64) -> Self {
        let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
        // NaN falls back to the minimum through f64::max
        let per_second = per_second.max(MIN_CALLS_PER_SECOND);
        let period = Duration::from_secs_f64(1.0 / per_second);

        // A sub-nanosecond period means effectively unlimited
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MAX))
            .allow_burst(burst);

        Self {
            burst: burst.get(),
            per_second,
            limiter: governor::RateLimiter::direct(quota),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.burst, config.per_second)
    }

    /// Wait until a call may go out
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("burst", &self.burst)
            .field("per_second", &self.per_second)
            .finish()
    }
}
