//! Domain entities.

mod anonymous_user;
mod episode;
mod story;
mod submission;
mod vote;

pub use anonymous_user::AnonymousUser;
pub use episode::Episode;
pub use story::Story;
pub use submission::Submission;
pub use vote::Vote;
