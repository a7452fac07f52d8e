//! Vote service implementation.

use crate::dto::{present, CastVoteRequest, CastVoteResponse, VoteResponse, VoteStatusQuery, VoteStatusResponse};
use crate::participation::ParticipationPolicy;
use crate::vote_service::VoteService;
use crate::{input, metrics};
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use storyloop_core::{StoryError, StoryResult, SubmissionId, Vote};
use storyloop_repository::{SubmissionRepository, VoteRepository};
use storyloop_resilience::LimitedAction;
use tracing::{debug, info};

#[derive(Component)]
#[shaku(interface = VoteService)]
pub struct VoteServiceImpl {
    #[shaku(inject)]
    votes: Arc<dyn VoteRepository>,
    #[shaku(inject)]
    submissions: Arc<dyn SubmissionRepository>,
    policy: ParticipationPolicy,
}

impl VoteServiceImpl {
    pub fn new(
        votes: Arc<dyn VoteRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        policy: ParticipationPolicy,
    ) -> Self {
        Self {
            votes,
            submissions,
            policy,
        }
    }
}

#[async_trait]
impl VoteService for VoteServiceImpl {
    async fn status(&self, query: VoteStatusQuery) -> StoryResult<VoteStatusResponse> {
        let (Some(date), Some(slot), Some(user)) = (
            present(query.session_date.as_deref()),
            present(query.session_time.as_deref()),
            present(query.anonymous_user_id.as_deref()),
        ) else {
            return Err(StoryError::validation("sessionDate, sessionTime and anonymousUserId are required"));
        };
        let session = input::session_key_from_query(Some(date), Some(slot))?;
        let user = input::user_id(user)?;

        let vote = self.votes.find_by_voter(session, user).await?;
        let own = self.submissions.find_by_author(session, user).await?;
        debug!("Vote status for {} in {}: voted={}", user, session, vote.is_some());

        Ok(VoteStatusResponse {
            has_voted: vote.is_some(),
            has_submitted: own.is_some(),
            submission_id: own.map(|s| s.id),
            voted_submission_id: vote.map(|v| v.submission_id),
        })
    }

    async fn cast(&self, request: CastVoteRequest, ip_hash: &str) -> StoryResult<CastVoteResponse> {
        let (Some(target), Some(date), Some(slot), Some(user)) = (
            present(request.submission_id.as_deref()),
            present(request.session_date.as_deref()),
            request.session_time,
            present(request.anonymous_user_id.as_deref()),
        ) else {
            return Err(StoryError::validation(input::MISSING_FIELDS));
        };

        let session = input::session_key(date, slot)?;
        let voter = input::user_id(user)?;

        let target = SubmissionId::parse(target).map_err(|_| StoryError::not_found("Submission", target))?;
        let submission = self
            .submissions
            .find_by_id(target)
            .await?
            .ok_or_else(|| StoryError::not_found("Submission", target))?;

        if submission.is_authored_by(voter) {
            return Err(StoryError::validation("Cannot vote on your own submission"));
        }
        if submission.session() != session {
            return Err(StoryError::validation("Invalid submission for this session"));
        }

        self.policy.ensure_open(session, "Session is not open for voting")?;
        self.policy.check_rate(LimitedAction::Vote, ip_hash, session).await?;

        let vote = Vote::new(submission.id, voter, session, self.policy.now());
        let cast = self.votes.cast(&vote).await.map_err(|e| match e {
            StoryError::Conflict(_) => StoryError::conflict("You have already voted in this session"),
            StoryError::NotFound { .. } => StoryError::not_found("Submission", target),
            other => other,
        })?;

        metrics::record_vote();
        info!("Vote {} cast for submission {}", cast.id, cast.submission_id);
        Ok(CastVoteResponse {
            message: "Vote cast successfully".to_string(),
            vote: VoteResponse::from(cast),
        })
    }
}
