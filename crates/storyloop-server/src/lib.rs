//! # Storyloop Server Library
//!
//! Wiring of configuration, storage, rate limiting and services into the
//! HTTP application, plus startup utilities.

pub mod di;
pub mod startup;
