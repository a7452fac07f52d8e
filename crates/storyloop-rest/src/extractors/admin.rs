//! Admin token extractor.

use crate::{responses::AppError, state::AppState};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use storyloop_core::StoryError;
use storyloop_security::Claims;
use tracing::debug;

/// Extractor for a caller holding a valid admin token.
///
/// Rejects with 401 when the `Bearer` token is missing or invalid and with
/// 403 when it lacks the admin role.
pub struct AdminUser(pub Claims);

impl std::ops::Deref for AdminUser {
    type Target = Claims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| StoryError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| StoryError::unauthorized("Invalid authorization format"))?;

        let claims = state.auth_service.validate(token).await?;
        debug!("Admin request from {}", claims.sub);
        Ok(Self(claims))
    }
}
