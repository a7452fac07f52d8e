//! Anonymous identity DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyloop_core::rules::not_blank;
use storyloop_core::{AnonymousUser, AnonymousUserId};
use utoipa::ToSchema;
use validator::Validate;

/// Request to register (or re-announce) a browser fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterIdentityRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 512, message = "Fingerprint cannot exceed 512 characters")
    )]
    pub fingerprint: String,
}

/// An anonymous participant. The fingerprint is never echoed back.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnonymousUserResponse {
    pub id: AnonymousUserId,
    pub first_seen: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl From<AnonymousUser> for AnonymousUserResponse {
    fn from(user: AnonymousUser) -> Self {
        Self {
            id: user.id,
            first_seen: user.first_seen,
            last_active: user.last_active,
        }
    }
}
