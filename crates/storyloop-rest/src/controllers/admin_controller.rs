//! Admin token controller.

use crate::{
    extractors::ApiJson,
    responses::{ok, ApiResult},
    state::AppState,
};
use axum::{extract::State, routing::post, Router};
use storyloop_core::ErrorResponse;
use storyloop_service::{AdminTokenRequest, AdminTokenResponse};

/// Creates the admin router.
pub fn router() -> Router<AppState> {
    Router::new().route("/token", post(issue_token))
}

/// Exchanges the operator key for an admin token.
#[utoipa::path(
    post,
    path = "/admin/token",
    tag = "admin",
    request_body = AdminTokenRequest,
    responses(
        (status = 200, description = "Admin token issued", body = AdminTokenResponse),
        (status = 401, description = "Wrong or missing key", body = ErrorResponse)
    )
)]
pub async fn issue_token(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AdminTokenRequest>,
) -> ApiResult<AdminTokenResponse> {
    let response = state.auth_service.issue_token(request).await?;
    ok(response)
}
