//! Vote service trait definition.

use crate::dto::{CastVoteRequest, CastVoteResponse, VoteStatusQuery, VoteStatusResponse};
use async_trait::async_trait;
use storyloop_core::{Interface, StoryResult};

#[async_trait]
pub trait VoteService: Interface + Send + Sync {
    /// Whether the participant already submitted and voted in a slot.
    async fn status(&self, query: VoteStatusQuery) -> StoryResult<VoteStatusResponse>;

    /// Casts a vote on behalf of a participant whose address hashes to `ip_hash`.
    async fn cast(&self, request: CastVoteRequest, ip_hash: &str) -> StoryResult<CastVoteResponse>;
}
