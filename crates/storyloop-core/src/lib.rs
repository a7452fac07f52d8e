//! # Storyloop Core
//!
//! Core types, domain rules, and error definitions for Storyloop.
//! Everything in here is free of I/O: the session schedule, story progress
//! accounting, and phrase rules are pure functions over the domain records.

pub mod clock;
pub mod domain;
pub mod error;
pub mod id;
pub mod result;
pub mod telemetry;
pub mod traits;
pub mod validation;

pub use clock::*;
pub use domain::*;
pub use error::*;
pub use id::*;
pub use result::*;
pub use traits::*;
pub use validation::*;

// Re-export the DI marker so interface traits need no direct shaku import.
pub use shaku::Interface;
