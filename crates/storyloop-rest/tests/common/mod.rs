//! Shared router fixture: in-memory storage and a pinned clock.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use storyloop_config::{SecurityConfig, ServerConfig};
use storyloop_core::{Clock, FixedClock, HealthCheck, SessionSchedule};
use storyloop_repository::MemoryStore;
use storyloop_resilience::MemoryWindowStore;
use storyloop_rest::{create_router, AppState};
use storyloop_security::{AdminKeyHasher, IpHasher};
use storyloop_service::{
    AuthServiceImpl, EpisodeServiceImpl, IdentityServiceImpl, ParticipationLimits, ParticipationPolicy,
    SessionServiceImpl, StoryServiceImpl, SubmissionServiceImpl, VoteServiceImpl,
};
use tower::ServiceExt;

pub const ADMIN_KEY: &str = "let-me-direct";

/// Date of the open session in `TestApp`.
pub const SESSION_DATE: &str = "2024-05-01";
/// Slot open at the pinned instant (12:00-14:00 UTC).
pub const OPEN_SLOT: i64 = 2;

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub clock: Arc<FixedClock>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_limits(ParticipationLimits::default())
    }

    pub fn with_limits(limits: ParticipationLimits) -> Self {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()));
        let store = MemoryStore::new();
        let shared_clock: Arc<dyn Clock> = clock.clone();
        let schedule = SessionSchedule::utc();

        let policy = ParticipationPolicy::new(
            schedule,
            shared_clock.clone(),
            Arc::new(MemoryWindowStore::with_clock(shared_clock.clone())),
            limits,
        );
        let security = SecurityConfig {
            admin_key_hash: Some(AdminKeyHasher::new().hash(ADMIN_KEY).unwrap()),
            ..SecurityConfig::default()
        };
        let health: Arc<dyn HealthCheck> = Arc::new(store.clone());

        let state = AppState {
            session_service: Arc::new(SessionServiceImpl::new(schedule, shared_clock.clone())),
            identity_service: Arc::new(IdentityServiceImpl::new(Arc::new(store.users()), shared_clock.clone())),
            submission_service: Arc::new(SubmissionServiceImpl::new(Arc::new(store.submissions()), policy.clone())),
            vote_service: Arc::new(VoteServiceImpl::new(
                Arc::new(store.votes()),
                Arc::new(store.submissions()),
                policy,
            )),
            story_service: Arc::new(StoryServiceImpl::new(
                Arc::new(store.stories()),
                Arc::new(store.episodes()),
                shared_clock.clone(),
            )),
            episode_service: Arc::new(EpisodeServiceImpl::new(
                Arc::new(store.stories()),
                Arc::new(store.episodes()),
                shared_clock,
            )),
            auth_service: Arc::new(AuthServiceImpl::new(Arc::new(security))),
            ip_hasher: Arc::new(IpHasher::new("test-salt")),
            health_checks: vec![health],
            metrics: None,
        };

        Self {
            router: create_router(state, &ServerConfig::default(), None),
            store,
            clock,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request(uri, &body, None, None)).await
    }

    /// Posts from the client address `ip`.
    pub async fn post_from(&self, ip: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request(uri, &body, Some(ip), None)).await
    }

    pub async fn post_as_admin(&self, token: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request(uri, &body, None, Some(token))).await
    }

    /// Registers a fingerprint and returns the anonymous user ID.
    pub async fn register(&self, fingerprint: &str) -> String {
        let (status, body) = self
            .post("/api/v1/identity", serde_json::json!({ "fingerprint": fingerprint }))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        let (status, body) = self
            .post("/api/v1/admin/token", serde_json::json!({ "adminKey": ADMIN_KEY }))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["access_token"].as_str().unwrap().to_string()
    }
}

fn json_request(uri: &str, body: &Value, ip: Option<&str>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(ip) = ip {
        builder = builder.header("x-forwarded-for", ip);
    }
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
