//! Submission entity.

use crate::domain::phrase::{normalize_phrase, word_count};
use crate::domain::session::{SessionKey, SessionSlot};
use crate::{AnonymousUserId, Entity, SubmissionId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A phrase proposed for one session slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,

    /// Normalized phrase text.
    pub phrase: String,

    pub word_count: u32,

    pub session_date: NaiveDate,

    /// Slot index, serialized as 0..=3.
    pub session_time: SessionSlot,

    /// Author of the phrase.
    pub anonymous_user_id: AnonymousUserId,

    /// Salted hash of the author's IP address (never exposed via API).
    #[serde(skip_serializing, default)]
    pub ip_hash: Option<String>,

    /// Number of votes received.
    pub votes: u32,

    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// Creates a submission with no votes.
    #[must_use]
    pub fn new(
        phrase: &str,
        session: SessionKey,
        anonymous_user_id: AnonymousUserId,
        ip_hash: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let phrase = normalize_phrase(phrase);
        let word_count = u32::try_from(word_count(&phrase)).unwrap_or(u32::MAX);
        Self {
            id: SubmissionId::new(),
            phrase,
            word_count,
            session_date: session.date,
            session_time: session.slot,
            anonymous_user_id,
            ip_hash,
            votes: 0,
            created_at: now,
        }
    }

    /// The slot this submission competes in.
    #[must_use]
    pub const fn session(&self) -> SessionKey {
        SessionKey::new(self.session_date, self.session_time)
    }

    /// Whether `user` wrote this submission.
    #[must_use]
    pub fn is_authored_by(&self, user: AnonymousUserId) -> bool {
        self.anonymous_user_id == user
    }
}

impl Entity<SubmissionId> for Submission {
    fn id(&self) -> &SubmissionId {
        &self.id
    }
}
