//! Vote DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use storyloop_core::{AnonymousUserId, SubmissionId, Vote, VoteId};
use utoipa::{IntoParams, ToSchema};

/// Query for a participant's standing in a slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VoteStatusQuery {
    pub session_date: Option<String>,
    pub session_time: Option<String>,
    pub anonymous_user_id: Option<String>,
}

/// Whether a participant already acted in a slot.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VoteStatusResponse {
    pub has_voted: bool,
    pub has_submitted: bool,
    /// The participant's own submission in the slot.
    pub submission_id: Option<SubmissionId>,
    /// The submission the participant voted for.
    pub voted_submission_id: Option<SubmissionId>,
}

/// Request to vote for a submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub submission_id: Option<String>,
    pub session_date: Option<String>,
    pub session_time: Option<i64>,
    pub anonymous_user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VoteResponse {
    pub id: VoteId,
    pub submission_id: SubmissionId,
    pub anonymous_user_id: AnonymousUserId,
    #[schema(value_type = String, format = Date)]
    pub session_date: NaiveDate,
    pub session_time: u8,
    pub created_at: DateTime<Utc>,
}

impl From<Vote> for VoteResponse {
    fn from(vote: Vote) -> Self {
        Self {
            id: vote.id,
            submission_id: vote.submission_id,
            anonymous_user_id: vote.anonymous_user_id,
            session_date: vote.session_date,
            session_time: vote.session_time.index(),
            created_at: vote.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CastVoteResponse {
    pub message: String,
    pub vote: VoteResponse,
}
