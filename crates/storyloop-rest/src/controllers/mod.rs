//! REST API controllers.

pub mod admin_controller;
pub mod episode_controller;
pub mod health_controller;
pub mod identity_controller;
pub mod session_controller;
pub mod story_controller;
pub mod submission_controller;
pub mod vote_controller;

pub use health_controller::*;
