//! # Storyloop Repository
//!
//! Data access for Storyloop. Services depend only on the traits in
//! [`traits`]; two backends implement them:
//!
//! ```text
//! Service
//!   ↓  Arc<dyn SubmissionRepository> ...
//! Pg*Repository        (PostgreSQL through sqlx, one struct per table)
//! Memory*Repository    (one lock-guarded MemoryStore shared by all)
//! ```
//!
//! Both enforce the same uniqueness rules and report violations as
//! `StoryError::Conflict`.

pub mod memory;
pub mod pool;
pub mod postgres;
pub mod seed;
pub mod traits;

pub use memory::*;
pub use pool::*;
pub use postgres::*;
pub use seed::seed_demo_story;
pub use traits::*;
