//! Vote entity.

use crate::domain::session::{SessionKey, SessionSlot};
use crate::{AnonymousUserId, Entity, SubmissionId, VoteId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One participant's pick for one session slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub submission_id: SubmissionId,
    pub anonymous_user_id: AnonymousUserId,
    pub session_date: NaiveDate,
    pub session_time: SessionSlot,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    /// Creates a vote cast at `now`.
    #[must_use]
    pub fn new(
        submission_id: SubmissionId,
        anonymous_user_id: AnonymousUserId,
        session: SessionKey,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: VoteId::new(),
            submission_id,
            anonymous_user_id,
            session_date: session.date,
            session_time: session.slot,
            created_at: now,
        }
    }

    /// The slot this vote was cast in.
    #[must_use]
    pub const fn session(&self) -> SessionKey {
        SessionKey::new(self.session_date, self.session_time)
    }
}

impl Entity<VoteId> for Vote {
    fn id(&self) -> &VoteId {
        &self.id
    }
}
