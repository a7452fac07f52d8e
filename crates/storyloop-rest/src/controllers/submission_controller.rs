//! Phrase submission controller.

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
use storyloop_service::{
    CreateSubmissionRequest, CreateSubmissionResponse, SessionQuery, SubmissionListResponse, WinnerResponse,
};

/// Creates the submission router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_submissions).post(create_submission))
        .route("/winner", get(session_winner))
}

/// Submissions of a session slot, most voted first.
#[utoipa::path(
    get,
    path = "/submissions",
    tag = "submissions",
    params(SessionQuery),
    responses(
        (status = 200, description = "Ranked submissions", body = SubmissionListResponse),
        (status = 400, description = "Missing or invalid session", body = ErrorResponse)
    )
)]
pub async fn list_submissions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SessionQuery>,
) -> ApiResult<SubmissionListResponse> {
    let response = state.submission_service.list(query).await?;
    ok(response)
}

/// Submits a phrase to the open session.
#[utoipa::path(
    post,
    path = "/submissions",
    tag = "submissions",
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Submission created", body = CreateSubmissionResponse),
        (status = 400, description = "Invalid phrase or session", body = ErrorResponse),
        (status = 409, description = "Already submitted in this session", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    )
)]
pub async fn create_submission(
    State(state): State<AppState>,
    client: ClientIp,
    ApiJson(request): ApiJson<CreateSubmissionRequest>,
) -> CreatedResult<CreateSubmissionResponse> {
    let response = state.submission_service.create(request, &client.hash).await?;
    created(response)
}

/// The leading submission of a session slot.
#[utoipa::path(
    get,
    path = "/submissions/winner",
    tag = "submissions",
    params(SessionQuery),
    responses(
        (status = 200, description = "Winning submission", body = WinnerResponse),
        (status = 404, description = "No submissions in the session", body = ErrorResponse)
    )
)]
pub async fn session_winner(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SessionQuery>,
) -> ApiResult<WinnerResponse> {
    let response = state.submission_service.winner(query).await?;
    ok(response)
}
