//! Service implementations.
//!
//! Trait definitions live in the parent module (e.g. `submission_service.rs`).

pub mod episode_service_impl;
pub mod identity_service_impl;
pub mod session_service_impl;
pub mod story_service_impl;
pub mod submission_service_impl;
pub mod vote_service_impl;

pub use episode_service_impl::{EpisodeServiceImpl, EpisodeServiceImplParameters};
pub use identity_service_impl::{IdentityServiceImpl, IdentityServiceImplParameters};
pub use session_service_impl::{SessionServiceImpl, SessionServiceImplParameters};
pub use story_service_impl::{StoryServiceImpl, StoryServiceImplParameters};
pub use submission_service_impl::{SubmissionServiceImpl, SubmissionServiceImplParameters};
pub use vote_service_impl::{VoteServiceImpl, VoteServiceImplParameters};
