//! Voting session controller.

use crate::{
    responses::{ok, ApiResult},
    state::AppState,
};
use axum::{extract::State, routing::get, Router};
use storyloop_service::SessionStatusResponse;

/// Creates the session router.
pub fn router() -> Router<AppState> {
    Router::new().route("/status", get(session_status))
}

/// Current and next voting session.
#[utoipa::path(
    get,
    path = "/sessions/status",
    tag = "sessions",
    responses(
        (status = 200, description = "Session schedule status", body = SessionStatusResponse)
    )
)]
pub async fn session_status(State(state): State<AppState>) -> ApiResult<SessionStatusResponse> {
    let response = state.session_service.status().await?;
    ok(response)
}
