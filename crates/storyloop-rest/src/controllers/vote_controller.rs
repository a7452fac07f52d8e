//! Voting controller.

use crate::{
    extractors::{ApiJson, ApiQuery, ClientIp},
    responses::{created, ok, ApiResult, CreatedResult},
    state::AppState,
};
use axum::{
    extract::State,
    routing::get,
    Router,
};
use storyloop_core::ErrorResponse;
use storyloop_service::{CastVoteRequest, CastVoteResponse, VoteStatusQuery, VoteStatusResponse};

/// Creates the vote router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(vote_status).post(cast_vote))
}

/// Whether the caller submitted or voted in a session slot.
#[utoipa::path(
    get,
    path = "/votes",
    tag = "votes",
    params(VoteStatusQuery),
    responses(
        (status = 200, description = "Participation of the caller", body = VoteStatusResponse),
        (status = 400, description = "Missing parameters", body = ErrorResponse)
    )
)]
pub async fn vote_status(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VoteStatusQuery>,
) -> ApiResult<VoteStatusResponse> {
    let response = state.vote_service.status(query).await?;
    ok(response)
}

/// Votes for a submission of the open session.
#[utoipa::path(
    post,
    path = "/votes",
    tag = "votes",
    request_body = CastVoteRequest,
    responses(
        (status = 201, description = "Vote cast", body = CastVoteResponse),
        (status = 400, description = "Own submission, wrong or closed session", body = ErrorResponse),
        (status = 404, description = "Unknown submission", body = ErrorResponse),
        (status = 409, description = "Already voted in this session", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    )
)]
pub async fn cast_vote(
    State(state): State<AppState>,
    client: ClientIp,
    ApiJson(request): ApiJson<CastVoteRequest>,
) -> CreatedResult<CastVoteResponse> {
    let response = state.vote_service.cast(request, &client.hash).await?;
    created(response)
}
