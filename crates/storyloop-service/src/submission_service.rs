//! Submission service trait definition.

use crate::dto::{CreateSubmissionRequest, CreateSubmissionResponse, SessionQuery, SubmissionListResponse, WinnerResponse};
use async_trait::async_trait;
use storyloop_core::{Interface, StoryResult};

/// Phrase submissions.
#[async_trait]
pub trait SubmissionService: Interface + Send + Sync {
    /// Submissions of a slot, best first.
    async fn list(&self, query: SessionQuery) -> StoryResult<SubmissionListResponse>;

    /// Submits a phrase on behalf of a participant whose address hashes to `ip_hash`.
    async fn create(&self, request: CreateSubmissionRequest, ip_hash: &str) -> StoryResult<CreateSubmissionResponse>;

    /// The leading submission of a slot.
    async fn winner(&self, query: SessionQuery) -> StoryResult<WinnerResponse>;
}
