//! Episode service trait definition.

use crate::dto::{CreateEpisodeRequest, CreateEpisodeResponse, EpisodeListQuery, EpisodeListResponse};
use async_trait::async_trait;
use storyloop_core::{Interface, StoryResult};

#[async_trait]
pub trait EpisodeService: Interface + Send + Sync {
    /// Episodes of a story in order.
    async fn list(&self, query: EpisodeListQuery) -> StoryResult<EpisodeListResponse>;

    /// Appends an episode to a story.
    async fn create(&self, request: CreateEpisodeRequest) -> StoryResult<CreateEpisodeResponse>;
}
