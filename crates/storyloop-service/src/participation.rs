//! Rules shared by submitting and voting: the open window and the per-IP limit.

use crate::metrics;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use storyloop_config::{RateLimitConfig, VotingConfig};
use storyloop_core::{Clock, SessionKey, SessionSchedule, StoryError, StoryResult};
use storyloop_resilience::{participation_key, LimitedAction, WindowRateLimiter};
use tracing::{debug, warn};

/// Participation limits resolved from configuration.
#[derive(Debug, Clone, Copy)]
pub struct ParticipationLimits {
    pub enforce_session_window: bool,
    pub rate_limit_enabled: bool,
    pub submissions_per_session: u32,
    pub votes_per_session: u32,
    pub window: Duration,
}

impl ParticipationLimits {
    #[must_use]
    pub fn from_config(voting: &VotingConfig, rate_limit: &RateLimitConfig) -> Self {
        Self {
            enforce_session_window: voting.enforce_session_window,
            rate_limit_enabled: rate_limit.enabled,
            submissions_per_session: rate_limit.submissions_per_session,
            votes_per_session: rate_limit.votes_per_session,
            window: window_duration(rate_limit.window_secs),
        }
    }
}

/// Window length, clamped to the largest window configuration accepts.
fn window_duration(secs: u64) -> Duration {
    let secs = secs.min(RateLimitConfig::MAX_WINDOW_SECS);
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

impl Default for ParticipationLimits {
    fn default() -> Self {
        Self::from_config(&VotingConfig::default(), &RateLimitConfig::default())
    }
}

/// Gatekeeper for participation in a session slot.
#[derive(Clone)]
pub struct ParticipationPolicy {
    schedule: SessionSchedule,
    clock: Arc<dyn Clock>,
    limiter: Arc<dyn WindowRateLimiter>,
    limits: ParticipationLimits,
}

impl ParticipationPolicy {
    #[must_use]
    pub fn new(
        schedule: SessionSchedule,
        clock: Arc<dyn Clock>,
        limiter: Arc<dyn WindowRateLimiter>,
        limits: ParticipationLimits,
    ) -> Self {
        Self {
            schedule,
            clock,
            limiter,
            limits,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub const fn schedule(&self) -> &SessionSchedule {
        &self.schedule
    }

    /// Fails with `message` when the slot is not open right now.
    pub fn ensure_open(&self, session: SessionKey, message: &str) -> StoryResult<()> {
        if self.limits.enforce_session_window && !self.schedule.is_open(session, self.clock.now()) {
            debug!("Session {} is closed", session);
            return Err(StoryError::validation(message));
        }
        Ok(())
    }

    /// Counts one attempt of `action` from `ip_hash` in the slot.
    pub async fn check_rate(&self, action: LimitedAction, ip_hash: &str, session: SessionKey) -> StoryResult<()> {
        if !self.limits.rate_limit_enabled {
            return Ok(());
        }

        let (max, label, message) = match action {
            LimitedAction::Submit => (
                self.limits.submissions_per_session,
                "submit",
                "Rate limit exceeded. Only one submission per session allowed.",
            ),
            LimitedAction::Vote => (
                self.limits.votes_per_session,
                "vote",
                "Rate limit exceeded. Only one vote per session allowed.",
            ),
        };

        let key = participation_key(action, ip_hash, session);
        let decision = self.limiter.check(&key, max, self.limits.window).await?;
        if !decision.allowed {
            warn!("Rate limit hit for {} in session {}", label, session);
            metrics::record_rate_limited(label);
            return Err(StoryError::rate_limited(message));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ParticipationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticipationPolicy")
            .field("schedule", &self.schedule)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}
