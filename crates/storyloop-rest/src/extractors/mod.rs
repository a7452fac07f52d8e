//! Custom Axum extractors.

mod admin;
mod client_ip;
mod validated;

pub use admin::*;
pub use client_ip::*;
pub use validated::*;
