//! Submission service implementation.

use crate::dto::{
    present, CreateSubmissionRequest, CreateSubmissionResponse, SessionQuery, SubmissionListResponse,
    SubmissionResponse, WinnerResponse,
};
use crate::participation::ParticipationPolicy;
use crate::submission_service::SubmissionService;
use crate::{input, metrics};
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use storyloop_core::{validate_phrase, FieldError, StoryError, StoryResult, Submission};
use storyloop_repository::SubmissionRepository;
use storyloop_resilience::LimitedAction;
use tracing::{debug, info};

#[derive(Component)]
#[shaku(interface = SubmissionService)]
pub struct SubmissionServiceImpl {
    #[shaku(inject)]
    submissions: Arc<dyn SubmissionRepository>,
    policy: ParticipationPolicy,
}

impl SubmissionServiceImpl {
    pub fn new(submissions: Arc<dyn SubmissionRepository>, policy: ParticipationPolicy) -> Self {
        Self { submissions, policy }
    }
}

#[async_trait]
impl SubmissionService for SubmissionServiceImpl {
    async fn list(&self, query: SessionQuery) -> StoryResult<SubmissionListResponse> {
        let session = input::session_key_from_query(query.session_date.as_deref(), query.session_time.as_deref())?;
        debug!("Listing submissions for session {}", session);

        let submissions = self.submissions.find_by_session(session).await?;
        Ok(SubmissionListResponse {
            submissions: submissions.into_iter().map(SubmissionResponse::from).collect(),
        })
    }

    async fn create(&self, request: CreateSubmissionRequest, ip_hash: &str) -> StoryResult<CreateSubmissionResponse> {
        let (Some(phrase), Some(date), Some(slot), Some(user)) = (
            present(request.phrase.as_deref()),
            present(request.session_date.as_deref()),
            request.session_time,
            present(request.anonymous_user_id.as_deref()),
        ) else {
            return Err(StoryError::validation(input::MISSING_FIELDS));
        };

        let validation = validate_phrase(phrase);
        if !validation.is_valid {
            let fields = validation
                .issues
                .iter()
                .map(|issue| FieldError::new("phrase", issue.code(), issue.message()))
                .collect();
            return Err(StoryError::invalid_fields("Invalid phrase", fields));
        }

        let session = input::session_key(date, slot)?;
        let author = input::user_id(user)?;
        self.policy.ensure_open(session, "Session is not open for submissions")?;
        self.policy.check_rate(LimitedAction::Submit, ip_hash, session).await?;

        let submission = Submission::new(phrase, session, author, Some(ip_hash.to_string()), self.policy.now());
        let saved = self.submissions.save(&submission).await.map_err(|e| match e {
            StoryError::Conflict(_) => StoryError::conflict("You have already submitted for this session"),
            other => other,
        })?;

        metrics::record_submission();
        info!("Submission {} created for session {}", saved.id, session);
        Ok(CreateSubmissionResponse {
            message: "Submission created successfully".to_string(),
            submission: SubmissionResponse::from(saved),
        })
    }

    async fn winner(&self, query: SessionQuery) -> StoryResult<WinnerResponse> {
        let session = input::session_key_from_query(query.session_date.as_deref(), query.session_time.as_deref())?;

        let winner = self
            .submissions
            .find_top_by_session(session)
            .await?
            .ok_or_else(|| StoryError::not_found("Winning submission", session))?;
        Ok(WinnerResponse {
            winner: SubmissionResponse::from(winner),
        })
    }
}
