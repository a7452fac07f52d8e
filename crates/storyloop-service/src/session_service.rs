//! Session schedule service trait definition.

use crate::dto::SessionStatusResponse;
use async_trait::async_trait;
use storyloop_core::{Interface, StoryResult};

/// Read-only view of the daily schedule.
#[async_trait]
pub trait SessionService: Interface + Send + Sync {
    /// Current and next session with countdowns.
    async fn status(&self) -> StoryResult<SessionStatusResponse>;
}
