//! Submission DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use storyloop_core::{AnonymousUserId, Submission, SubmissionId};
use utoipa::ToSchema;

/// Request to submit a phrase.
///
/// Every field is optional on the wire so that missing fields produce the
/// same error as blank ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionRequest {
    pub phrase: Option<String>,
    pub session_date: Option<String>,
    pub session_time: Option<i64>,
    pub anonymous_user_id: Option<String>,
}

/// A submission as shown to participants.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResponse {
    pub id: SubmissionId,
    pub phrase: String,
    pub word_count: u32,
    #[schema(value_type = String, format = Date)]
    pub session_date: NaiveDate,
    pub session_time: u8,
    pub anonymous_user_id: AnonymousUserId,
    pub votes: u32,
    pub created_at: DateTime<Utc>,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            phrase: submission.phrase,
            word_count: submission.word_count,
            session_date: submission.session_date,
            session_time: submission.session_time.index(),
            anonymous_user_id: submission.anonymous_user_id,
            votes: submission.votes,
            created_at: submission.created_at,
        }
    }
}

/// Ranked submissions of a slot.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmissionListResponse {
    pub submissions: Vec<SubmissionResponse>,
}

/// The leading submission of a slot.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WinnerResponse {
    pub winner: SubmissionResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSubmissionResponse {
    pub message: String,
    pub submission: SubmissionResponse,
}
