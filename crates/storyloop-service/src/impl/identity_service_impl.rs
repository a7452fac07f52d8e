//! Anonymous identity service implementation.

use crate::dto::{AnonymousUserResponse, RegisterIdentityRequest};
use crate::identity_service::IdentityService;
use crate::input;
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use storyloop_core::{Clock, StoryError, StoryResult, ValidateExt};
use storyloop_repository::AnonymousUserRepository;
use tracing::debug;

#[derive(Component)]
#[shaku(interface = IdentityService)]
pub struct IdentityServiceImpl {
    #[shaku(inject)]
    users: Arc<dyn AnonymousUserRepository>,
    clock: Arc<dyn Clock>,
}

impl IdentityServiceImpl {
    pub fn new(users: Arc<dyn AnonymousUserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }
}

#[async_trait]
impl IdentityService for IdentityServiceImpl {
    async fn register(&self, request: RegisterIdentityRequest) -> StoryResult<AnonymousUserResponse> {
        request.validate_request()?;

        let user = self
            .users
            .upsert_by_fingerprint(request.fingerprint.trim(), self.clock.now())
            .await?;

        debug!("Anonymous user {} checked in", user.id);
        Ok(AnonymousUserResponse::from(user))
    }

    async fn get(&self, id: &str) -> StoryResult<AnonymousUserResponse> {
        let id = input::user_id(id)?;
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| StoryError::not_found("User", id))?;
        Ok(AnonymousUserResponse::from(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use storyloop_core::FixedClock;
    use storyloop_repository::MemoryStore;

    fn service() -> (IdentityServiceImpl, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        (IdentityServiceImpl::new(Arc::new(MemoryStore::new().users()), clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_register_is_idempotent_per_fingerprint() {
        let (service, clock) = service();
        let request = RegisterIdentityRequest {
            fingerprint: " fp-123 ".into(),
        };

        let first = service.register(request.clone()).await.unwrap();
        clock.advance(Duration::minutes(10));
        let second = service.register(request).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.first_seen, first.first_seen);
        assert!(second.last_active > first.last_active);
    }

    #[tokio::test]
    async fn test_blank_fingerprint_is_rejected() {
        let (service, _) = service();
        let err = service
            .register(RegisterIdentityRequest { fingerprint: "   ".into() })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_get_unknown_and_malformed() {
        let (service, _) = service();
        let unknown = service.get("0190a6f2-7c1e-7d4a-8f00-0123456789ab").await.unwrap_err();
        assert!(matches!(unknown, StoryError::NotFound { .. }));

        let malformed = service.get("abc").await.unwrap_err();
        assert_eq!(malformed.to_string(), "Invalid user ID");
    }
}
