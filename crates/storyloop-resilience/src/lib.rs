//! # Storyloop Resilience
//!
//! Rate limiting for Storyloop:
//!
//! - [`WindowRateLimiter`]: keyed fixed windows bounding how often one
//!   client may submit or vote per session slot, kept in process memory
//!   ([`MemoryWindowStore`]) or in Redis ([`RedisWindowStore`]).
//! - [`RequestThrottle`]: global requests-per-second budget.

pub mod throttle;
pub mod window;

pub use throttle::*;
pub use window::*;
