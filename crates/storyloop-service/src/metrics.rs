//! Prometheus metrics for participation and story progress.

use metrics::{counter, describe_counter};

/// Metric names.
pub mod names {
    /// Phrases accepted.
    pub const SUBMISSIONS_TOTAL: &str = "storyloop_submissions_total";
    /// Votes cast.
    pub const VOTES_TOTAL: &str = "storyloop_votes_total";
    /// Episodes appended.
    pub const EPISODES_TOTAL: &str = "storyloop_episodes_total";
    /// Stories that reached completion.
    pub const STORIES_COMPLETED_TOTAL: &str = "storyloop_stories_completed_total";
    /// Participation attempts refused by the per-IP window.
    pub const RATE_LIMITED_TOTAL: &str = "storyloop_rate_limited_total";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(names::SUBMISSIONS_TOTAL, "Total number of phrases submitted");
    describe_counter!(names::VOTES_TOTAL, "Total number of votes cast");
    describe_counter!(names::EPISODES_TOTAL, "Total number of episodes appended to stories");
    describe_counter!(names::STORIES_COMPLETED_TOTAL, "Total number of stories completed");
    describe_counter!(names::RATE_LIMITED_TOTAL, "Total number of participation attempts refused by rate limiting");
}

pub(crate) fn record_submission() {
    counter!(names::SUBMISSIONS_TOTAL).increment(1);
}

pub(crate) fn record_vote() {
    counter!(names::VOTES_TOTAL).increment(1);
}

pub(crate) fn record_episode(completed_story: bool) {
    counter!(names::EPISODES_TOTAL).increment(1);
    if completed_story {
        record_story_completed("threshold");
    }
}

pub(crate) fn record_story_completed(reason: &'static str) {
    counter!(names::STORIES_COMPLETED_TOTAL, "reason" => reason).increment(1);
}

pub(crate) fn record_rate_limited(action: &'static str) {
    counter!(names::RATE_LIMITED_TOTAL, "action" => action).increment(1);
}
