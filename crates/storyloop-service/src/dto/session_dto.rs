//! Session schedule DTOs.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use storyloop_core::{format_time_remaining, Category, SessionStatus, VotingSession};
use utoipa::{IntoParams, ToSchema};

/// Query selecting one session slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SessionQuery {
    /// `YYYY-MM-DD`.
    pub session_date: Option<String>,
    /// Slot index 0..=3.
    pub session_time: Option<String>,
}

/// A session window.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    /// Slot index 0..=3.
    pub time: u8,
    pub category: Category,
    #[schema(value_type = String, format = DateTime)]
    pub starts_at: DateTime<FixedOffset>,
    #[schema(value_type = String, format = DateTime)]
    pub ends_at: DateTime<FixedOffset>,
    pub is_active: bool,
}

impl From<VotingSession> for SessionResponse {
    fn from(session: VotingSession) -> Self {
        Self {
            date: session.date,
            time: session.slot.index(),
            category: session.category,
            starts_at: session.starts_at,
            ends_at: session.ends_at,
            is_active: session.is_active,
        }
    }
}

/// Current and upcoming session with countdowns.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionStatusResponse {
    pub current_session: Option<SessionResponse>,
    pub next_session: SessionResponse,
    pub time_until_next_seconds: i64,
    pub time_until_end_seconds: i64,
    /// `HH:MM:SS`.
    pub time_until_next: String,
    /// `HH:MM:SS`.
    pub time_until_end: String,
    pub server_time: DateTime<Utc>,
}

impl SessionStatusResponse {
    #[must_use]
    pub fn new(status: SessionStatus, server_time: DateTime<Utc>) -> Self {
        Self {
            current_session: status.current_session.map(SessionResponse::from),
            next_session: SessionResponse::from(status.next_session),
            time_until_next_seconds: status.time_until_next.num_seconds(),
            time_until_end_seconds: status.time_until_end.num_seconds(),
            time_until_next: format_time_remaining(status.time_until_next),
            time_until_end: format_time_remaining(status.time_until_end),
            server_time,
        }
    }
}
