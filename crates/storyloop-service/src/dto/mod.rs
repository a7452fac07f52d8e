//! Data Transfer Objects (DTOs).
//!
//! Requests arrive in camelCase; responses keep the snake_case field names
//! of the stored records.

mod auth_dto;
mod episode_dto;
mod identity_dto;
mod session_dto;
mod story_dto;
mod submission_dto;
mod vote_dto;

pub use auth_dto::*;
pub use episode_dto::*;
pub use identity_dto::*;
pub use session_dto::*;
pub use story_dto::*;
pub use submission_dto::*;
pub use vote_dto::*;

/// Returns the value unless it is missing or blank.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
