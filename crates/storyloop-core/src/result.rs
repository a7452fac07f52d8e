//! Result type aliases for Storyloop.

use crate::StoryError;

/// A specialized `Result` type for Storyloop operations.
pub type StoryResult<T> = Result<T, StoryError>;
