//! Story controller.

use crate::{
    extractors::{AdminUser, ApiQuery, ValidatedJson},
    responses::{created, ok, ApiResult, CreatedResult},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use storyloop_core::ErrorResponse;
use storyloop_service::{
    CompleteStoryRequest, CreateStoryRequest, CreateStoryResponse, CurrentStoryResponse, StoryListQuery,
    StoryListResponse, StoryResponse, StoryStatusResponse,
};
use tracing::info;

/// Creates the story router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stories).post(create_story))
        .route("/status", get(story_status))
        .route("/:id/complete", post(complete_story))
}

/// Payload of `GET /stories`: the list, or only the current story.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StoriesPayload {
    List(StoryListResponse),
    Current(CurrentStoryResponse),
}

/// Lists stories, or returns the story in progress with `currentOnly`.
#[utoipa::path(
    get,
    path = "/stories",
    tag = "stories",
    params(StoryListQuery),
    responses(
        (status = 200, description = "Stories newest first, or `{ story }` when currentOnly=true", body = StoryListResponse)
    )
)]
pub async fn list_stories(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StoryListQuery>,
) -> ApiResult<StoriesPayload> {
    if query.current_only {
        let current = state.story_service.current().await?;
        return ok(StoriesPayload::Current(current));
    }
    let stories = state.story_service.list(query.include_completed).await?;
    ok(StoriesPayload::List(stories))
}

/// Opens the next story.
#[utoipa::path(
    post,
    path = "/stories",
    tag = "stories",
    request_body = CreateStoryRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Story created", body = CreateStoryResponse),
        (status = 401, description = "Missing or invalid admin token", body = ErrorResponse)
    )
)]
pub async fn create_story(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(request): ValidatedJson<CreateStoryRequest>,
) -> CreatedResult<CreateStoryResponse> {
    info!("Story creation requested by {}", admin.sub);
    let response = state.story_service.create(request).await?;
    created(response)
}

/// Progress of the story in progress.
#[utoipa::path(
    get,
    path = "/stories/status",
    tag = "stories",
    responses(
        (status = 200, description = "Story status", body = StoryStatusResponse)
    )
)]
pub async fn story_status(State(state): State<AppState>) -> ApiResult<StoryStatusResponse> {
    let response = state.story_service.status().await?;
    ok(response)
}

/// Closes a story, optionally attaching the stitched video.
#[utoipa::path(
    post,
    path = "/stories/{id}/complete",
    tag = "stories",
    params(("id" = String, Path, description = "Story ID")),
    request_body = CompleteStoryRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Story completed", body = StoryResponse),
        (status = 400, description = "Story already complete", body = ErrorResponse),
        (status = 404, description = "Unknown story", body = ErrorResponse)
    )
)]
pub async fn complete_story(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<CompleteStoryRequest>,
) -> ApiResult<StoryResponse> {
    info!("Completion of story {} requested by {}", id, admin.sub);
    let response = state.story_service.complete(&id, request).await?;
    ok(response)
}
