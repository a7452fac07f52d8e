//! Anonymous identity service trait definition.

use crate::dto::{AnonymousUserResponse, RegisterIdentityRequest};
use async_trait::async_trait;
use storyloop_core::{Interface, StoryResult};

/// Pseudonymous participants.
#[async_trait]
pub trait IdentityService: Interface + Send + Sync {
    /// Returns the participant owning the fingerprint, creating it on first sight.
    async fn register(&self, request: RegisterIdentityRequest) -> StoryResult<AnonymousUserResponse>;

    /// Gets a participant by ID.
    async fn get(&self, id: &str) -> StoryResult<AnonymousUserResponse>;
}
