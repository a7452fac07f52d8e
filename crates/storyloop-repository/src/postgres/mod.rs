//! PostgreSQL repositories.

mod anonymous_user_repository;
mod episode_repository;
mod story_repository;
mod submission_repository;
mod vote_repository;

pub use anonymous_user_repository::PgAnonymousUserRepository;
pub use episode_repository::PgEpisodeRepository;
pub use story_repository::PgStoryRepository;
pub use submission_repository::PgSubmissionRepository;
pub use vote_repository::PgVoteRepository;

use storyloop_core::{StoryError, StoryResult};

/// Reads a non-negative INTEGER column.
fn to_u32(value: i32, column: &'static str) -> StoryResult<u32> {
    u32::try_from(value).map_err(|_| StoryError::Internal(format!("Negative value in column {}: {}", column, value)))
}

/// Prepares a counter for an INTEGER column.
fn to_i32(value: u32, column: &'static str) -> StoryResult<i32> {
    i32::try_from(value).map_err(|_| StoryError::validation(format!("{} is too large: {}", column, value)))
}
