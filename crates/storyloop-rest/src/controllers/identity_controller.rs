//! Anonymous identity controller.

use crate::{
    extractors::ValidatedJson,
    responses::{ok, ApiResult},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use storyloop_core::ErrorResponse;
use storyloop_service::{AnonymousUserResponse, RegisterIdentityRequest};
use tracing::debug;

/// Creates the identity router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register_identity))
        .route("/:id", get(get_identity))
}

/// Registers a browser fingerprint, returning its anonymous user.
#[utoipa::path(
    post,
    path = "/identity",
    tag = "identity",
    request_body = RegisterIdentityRequest,
    responses(
        (status = 200, description = "Anonymous user for the fingerprint", body = AnonymousUserResponse),
        (status = 400, description = "Blank fingerprint", body = ErrorResponse)
    )
)]
pub async fn register_identity(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterIdentityRequest>,
) -> ApiResult<AnonymousUserResponse> {
    let response = state.identity_service.register(request).await?;
    ok(response)
}

/// Fetches an anonymous user.
#[utoipa::path(
    get,
    path = "/identity/{id}",
    tag = "identity",
    params(("id" = String, Path, description = "Anonymous user ID")),
    responses(
        (status = 200, description = "Anonymous user", body = AnonymousUserResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse)
    )
)]
pub async fn get_identity(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<AnonymousUserResponse> {
    debug!("Get identity request: {}", id);
    let response = state.identity_service.get(&id).await?;
    ok(response)
}
