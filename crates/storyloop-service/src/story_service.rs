//! Story service trait definition.

use crate::dto::{
    CompleteStoryRequest, CreateStoryRequest, CreateStoryResponse, CurrentStoryResponse, StoryListResponse,
    StoryResponse, StoryStatusResponse,
};
use async_trait::async_trait;
use storyloop_core::{Interface, StoryResult};

/// Stories and their progress.
#[async_trait]
pub trait StoryService: Interface + Send + Sync {
    /// The story in progress.
    async fn current(&self) -> StoryResult<CurrentStoryResponse>;

    /// Stories by number, newest first.
    async fn list(&self, include_completed: bool) -> StoryResult<StoryListResponse>;

    /// Opens the next story.
    async fn create(&self, request: CreateStoryRequest) -> StoryResult<CreateStoryResponse>;

    /// Progress of the story in progress.
    async fn status(&self) -> StoryResult<StoryStatusResponse>;

    /// Closes a story, optionally attaching its stitched video.
    async fn complete(&self, id: &str, request: CompleteStoryRequest) -> StoryResult<StoryResponse>;
}
