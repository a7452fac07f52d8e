//! Global request throttle middleware.

use crate::responses::AppError;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use storyloop_resilience::RequestThrottle;
use tracing::debug;

/// Answers 429 once the process-wide request budget is spent.
pub async fn throttle_middleware(
    State(throttle): State<RequestThrottle>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Err(e) = throttle.check() {
        debug!("Throttled {} {}", request.method(), request.uri());
        return AppError(e).into_response();
    }
    next.run(request).await
}
