//! # Storyloop Service
//!
//! Use cases of Storyloop. Each service is a trait with a `*Impl` holding
//! its repositories behind `Arc<dyn ...>`. The impls are Shaku components,
//! so the server injects whichever backend is configured while tests build
//! them directly with `new`.

pub mod auth_service;
pub mod dto;
pub mod episode_service;
pub mod identity_service;
pub mod metrics;
pub mod participation;
pub mod session_service;
pub mod story_service;
pub mod submission_service;
pub mod vote_service;

mod input;
#[path = "impl/mod.rs"]
pub mod service_impl;

pub use auth_service::*;
pub use dto::*;
pub use episode_service::*;
pub use identity_service::*;
pub use metrics::register_metrics;
pub use participation::*;
pub use service_impl::*;
pub use session_service::*;
pub use story_service::*;
pub use submission_service::*;
pub use vote_service::*;
