//! # Storyloop Security
//!
//! Participants are anonymous; only operators authenticate. This crate
//! provides the admin key check, the JWTs issued to operators, and the
//! salted hashing applied to client IP addresses before they are stored.

pub mod admin_key;
pub mod ip;
pub mod jwt;

pub use admin_key::*;
pub use ip::*;
pub use jwt::*;
