//! Main application router.

use crate::{
    controllers::{
        admin_controller, episode_controller, health_controller, identity_controller, session_controller,
        story_controller, submission_controller, vote_controller,
    },
    middleware::{logging_middleware, throttle_middleware},
    openapi::ApiDoc,
    state::AppState,
};
use axum::{
    http::{HeaderName, HeaderValue},
    middleware,
    routing::get,
    Router,
};
use storyloop_config::ServerConfig;
use storyloop_resilience::RequestThrottle;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Creates the main application router.
///
/// `throttle` caps requests per second across `/api/v1`; health and
/// metrics endpoints are never throttled.
pub fn create_router(state: AppState, server_config: &ServerConfig, throttle: Option<RequestThrottle>) -> Router {
    let cors = create_cors_layer(server_config);

    let mut api_router = Router::new()
        .nest("/sessions", session_controller::router())
        .nest("/identity", identity_controller::router())
        .nest("/submissions", submission_controller::router())
        .nest("/votes", vote_controller::router())
        .nest("/stories", story_controller::router())
        .nest("/episodes", episode_controller::router())
        .nest("/admin", admin_controller::router());
    if let Some(throttle) = throttle {
        api_router = api_router.layer(middleware::from_fn_with_state(throttle, throttle_middleware));
    }

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let router = Router::new()
        // Health endpoints
        .merge(health_controller::router())
        // API v1
        .nest("/api/v1", api_router)
        // Root endpoint
        .route("/", get(root))
        .with_state(state)
        // Swagger UI and OpenAPI spec
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware layers
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(server_config.max_body_size))
        .layer(TimeoutLayer::new(server_config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid));

    info!("Router created with REST endpoints and Swagger UI at /swagger-ui");
    router
}

/// Creates a CORS layer based on server configuration.
fn create_cors_layer(server_config: &ServerConfig) -> CorsLayer {
    if !server_config.cors_enabled {
        return CorsLayer::new();
    }
    if server_config.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server_config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Root endpoint handler.
async fn root() -> &'static str {
    "Storyloop API v1"
}
