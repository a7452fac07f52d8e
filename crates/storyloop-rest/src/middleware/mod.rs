//! HTTP middleware.

mod logging;
mod throttle;

pub use logging::*;
pub use throttle::*;
