//! Story DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use storyloop_core::domain::progress::format_duration;
use storyloop_core::rules::http_url;
use storyloop_core::{Story, StoryId, StoryStage, StoryStatus};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::EpisodeResponse;

/// Story listing filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StoryListQuery {
    /// Include completed stories.
    #[serde(default, deserialize_with = "query_flag")]
    pub include_completed: bool,
    /// Return only the story in progress.
    #[serde(default, deserialize_with = "query_flag")]
    pub current_only: bool,
}

/// A query flag is set only by the literal `true`.
fn query_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.is_some_and(|v| v == "true"))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoryResponse {
    pub id: StoryId,
    pub story_number: u32,
    pub title: Option<String>,
    pub total_duration_seconds: u32,
    pub episode_count: u32,
    pub is_complete: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub full_video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub progress_percentage: f64,
    pub stage: StoryStage,
}

impl From<Story> for StoryResponse {
    fn from(story: Story) -> Self {
        Self {
            progress_percentage: story.progress_percentage(),
            stage: story.stage(),
            id: story.id,
            story_number: story.story_number,
            title: story.title,
            total_duration_seconds: story.total_duration_seconds,
            episode_count: story.episode_count,
            is_complete: story.is_complete,
            completed_at: story.completed_at,
            full_video_url: story.full_video_url,
            created_at: story.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoryListResponse {
    pub stories: Vec<StoryResponse>,
}

/// The story in progress, if any.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentStoryResponse {
    pub story: Option<StoryResponse>,
}

/// Request to open a new story.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoryRequest {
    #[validate(length(max = 200, message = "Title cannot exceed 200 characters"))]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateStoryResponse {
    pub message: String,
    pub story: StoryResponse,
}

/// Request to close a story.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteStoryRequest {
    /// Stitched video of the whole story.
    #[validate(custom(function = "http_url"))]
    pub full_video_url: Option<String>,
}

/// Progress of the story in progress.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoryStatusResponse {
    pub current_story: Option<StoryResponse>,
    pub episodes: Vec<EpisodeResponse>,
    pub should_complete: bool,
    pub next_episode_number: u32,
    pub total_duration: u32,
    pub progress_percentage: f64,
    pub stage: StoryStage,
    pub stage_message: String,
    /// `m:ss`.
    pub formatted_duration: String,
}

impl From<StoryStatus> for StoryStatusResponse {
    fn from(status: StoryStatus) -> Self {
        let stage = status.stage();
        Self {
            current_story: status.current_story.map(StoryResponse::from),
            episodes: status.episodes.into_iter().map(EpisodeResponse::from).collect(),
            should_complete: status.should_complete,
            next_episode_number: status.next_episode_number,
            total_duration: status.total_duration,
            progress_percentage: status.progress_percentage,
            stage,
            stage_message: stage.message().to_string(),
            formatted_duration: format_duration(status.total_duration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyloop_core::ValidateExt;

    #[test]
    fn test_empty_status() {
        let response = StoryStatusResponse::from(StoryStatus::empty());
        assert!(response.current_story.is_none());
        assert_eq!(response.next_episode_number, 1);
        assert_eq!(response.formatted_duration, "0:00");
        assert_eq!(response.stage, StoryStage::Starting);
        assert_eq!(response.stage_message, "Story just beginning...");
    }

    #[test]
    fn test_complete_request_rejects_non_http_url() {
        let request = CompleteStoryRequest {
            full_video_url: Some("ftp://cdn/full.mp4".into()),
        };
        assert!(request.validate_request().is_err());
        assert!(CompleteStoryRequest::default().validate_request().is_ok());
    }

    #[test]
    fn test_list_query_defaults_to_false() {
        let query: StoryListQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.include_completed);
        assert!(!query.current_only);
    }

    #[test]
    fn test_list_query_flags_need_literal_true() {
        let query: StoryListQuery =
            serde_json::from_str(r#"{"currentOnly":"true","includeCompleted":"1"}"#).unwrap();
        assert!(query.current_only);
        assert!(!query.include_completed);
    }
}
