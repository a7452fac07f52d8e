//! Global request throttle.

use governor::{
    clock::DefaultClock,
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use storyloop_core::{StoryError, StoryResult};

/// Process-wide requests-per-second budget.
///
/// Clones share the same budget.
#[derive(Clone)]
pub struct RequestThrottle {
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RequestThrottle {
    /// Creates a throttle admitting `requests_per_second`, bursting up to the same amount.
    #[must_use]
    pub fn per_second(requests_per_second: u32) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Takes one unit of budget without waiting.
    pub fn check(&self) -> StoryResult<()> {
        self.limiter
            .check()
            .map_err(|_| StoryError::rate_limited("Too many requests, please slow down"))
    }
}

impl std::fmt::Debug for RequestThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestThrottle").finish_non_exhaustive()
    }
}
