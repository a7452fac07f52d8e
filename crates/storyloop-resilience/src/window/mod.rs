//! Keyed fixed-window rate limiting.

mod memory;
mod redis_store;

pub use memory::MemoryWindowStore;
pub use redis_store::{create_redis_pool, RedisWindowStore};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use storyloop_core::{SessionKey, StoryResult};

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    /// Whether the hit is within the limit.
    pub allowed: bool,
    /// Hits counted in the current window.
    pub count: u32,
    /// Hits left before the limit is reached.
    pub remaining: u32,
    /// When the current window ends.
    pub reset_at: DateTime<Utc>,
}

impl RateDecision {
    fn new(count: u32, max: u32, reset_at: DateTime<Utc>) -> Self {
        Self {
            allowed: count <= max,
            count,
            remaining: max.saturating_sub(count),
            reset_at,
        }
    }
}

/// Counts hits per key in fixed windows.
///
/// The first hit of a key opens a window of `window` length; hits beyond
/// `max` inside that window are denied.
#[async_trait]
pub trait WindowRateLimiter: Send + Sync {
    /// Records a hit for `key` and decides whether it is allowed.
    async fn check(&self, key: &str, max: u32, window: Duration) -> StoryResult<RateDecision>;
}

/// Which participation action a key limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitedAction {
    Submit,
    Vote,
}

impl LimitedAction {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Vote => "vote",
        }
    }
}

/// Key of a participation window: `{action}:{ip_hash}:{date}:{slot}`.
#[must_use]
pub fn participation_key(action: LimitedAction, ip_hash: &str, session: SessionKey) -> String {
    format!("{}:{}:{}:{}", action.prefix(), ip_hash, session.date, session.slot.index())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use storyloop_core::SessionSlot;

    #[test]
    fn test_participation_key_format() {
        let session = SessionKey::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), SessionSlot::Afternoon);
        assert_eq!(participation_key(LimitedAction::Submit, "abc", session), "submit:abc:2024-05-01:3");
        assert_eq!(participation_key(LimitedAction::Vote, "abc", session), "vote:abc:2024-05-01:3");
    }

    #[test]
    fn test_decision_remaining() {
        let reset = Utc::now();
        let first = RateDecision::new(1, 2, reset);
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);

        let over = RateDecision::new(3, 2, reset);
        assert!(!over.allowed);
        assert_eq!(over.remaining, 0);
    }
}
