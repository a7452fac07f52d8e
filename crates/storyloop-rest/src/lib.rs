//! # Storyloop REST
//!
//! REST API layer using Axum for Storyloop.
//! Provides HTTP endpoints for sessions, submissions, votes, stories,
//! episodes, admin tokens, and health checks.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
