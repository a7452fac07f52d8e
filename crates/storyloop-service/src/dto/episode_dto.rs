//! Episode DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyloop_core::rules::http_url;
use storyloop_core::{Episode, EpisodeId, StoryId};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::StoryResponse;

/// Longest accepted episode.
pub const MAX_EPISODE_SECONDS: u32 = 600;

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EpisodeListQuery {
    pub story_id: Option<String>,
    /// Only the first `limit` episodes.
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EpisodeResponse {
    pub id: EpisodeId,
    pub story_id: StoryId,
    pub episode_number: u32,
    pub video_url: Option<String>,
    pub duration_seconds: Option<u32>,
    pub winning_phrase: String,
    pub story_prompt: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Episode> for EpisodeResponse {
    fn from(episode: Episode) -> Self {
        Self {
            id: episode.id,
            story_id: episode.story_id,
            episode_number: episode.episode_number,
            video_url: episode.video_url,
            duration_seconds: episode.duration_seconds,
            winning_phrase: episode.winning_phrase,
            story_prompt: episode.story_prompt,
            created_at: episode.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EpisodeListResponse {
    pub episodes: Vec<EpisodeResponse>,
}

/// Request to append a generated episode to a story.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEpisodeRequest {
    pub story_id: Option<String>,

    #[validate(custom(function = "http_url"))]
    pub video_url: Option<String>,

    #[validate(range(max = 600, message = "Episodes cannot be longer than 600 seconds"))]
    pub duration_seconds: Option<u32>,

    pub winning_phrase: Option<String>,

    #[validate(length(max = 2000, message = "Story prompt cannot exceed 2000 characters"))]
    pub story_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEpisodeResponse {
    pub message: String,
    pub episode: EpisodeResponse,
    /// The story after the episode was added.
    pub story: StoryResponse,
}
