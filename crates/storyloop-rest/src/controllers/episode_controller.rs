//! Episode controller.

use crate::{
    extractors::{AdminUser, ApiQuery, ValidatedJson},
    responses::{created, ok, ApiResult, CreatedResult},
    state::AppState,
};
use axum::{
    extract::State,
    routing::get,
    Router,
};
use storyloop_core::ErrorResponse;
use storyloop_service::{CreateEpisodeRequest, CreateEpisodeResponse, EpisodeListQuery, EpisodeListResponse};
use tracing::info;

/// Creates the episode router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_episodes).post(create_episode))
}

/// Episodes of a story in order.
#[utoipa::path(
    get,
    path = "/episodes",
    tag = "episodes",
    params(EpisodeListQuery),
    responses(
        (status = 200, description = "Episodes by number", body = EpisodeListResponse),
        (status = 400, description = "Missing or invalid storyId", body = ErrorResponse)
    )
)]
pub async fn list_episodes(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EpisodeListQuery>,
) -> ApiResult<EpisodeListResponse> {
    let response = state.episode_service.list(query).await?;
    ok(response)
}

/// Appends a generated episode to a story.
#[utoipa::path(
    post,
    path = "/episodes",
    tag = "episodes",
    request_body = CreateEpisodeRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Episode created", body = CreateEpisodeResponse),
        (status = 400, description = "Invalid request or completed story", body = ErrorResponse),
        (status = 404, description = "Unknown story", body = ErrorResponse),
        (status = 409, description = "Concurrent append", body = ErrorResponse)
    )
)]
pub async fn create_episode(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(request): ValidatedJson<CreateEpisodeRequest>,
) -> CreatedResult<CreateEpisodeResponse> {
    info!("Episode creation requested by {}", admin.sub);
    let response = state.episode_service.create(request).await?;
    created(response)
}
