//! Application state for Axum handlers.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use storyloop_core::HealthCheck;
use storyloop_security::IpHasher;
use storyloop_service::{
    AuthService, EpisodeService, IdentityService, SessionService, StoryService, SubmissionService, VoteService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<dyn SessionService>,
    pub identity_service: Arc<dyn IdentityService>,
    pub submission_service: Arc<dyn SubmissionService>,
    pub vote_service: Arc<dyn VoteService>,
    pub story_service: Arc<dyn StoryService>,
    pub episode_service: Arc<dyn EpisodeService>,
    pub auth_service: Arc<dyn AuthService>,
    pub ip_hasher: Arc<IpHasher>,
    /// Dependencies checked by `/ready`.
    pub health_checks: Vec<Arc<dyn HealthCheck>>,
    /// Renders `/metrics`; absent when metrics are disabled.
    pub metrics: Option<PrometheusHandle>,
}
