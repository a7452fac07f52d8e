//! OpenAPI documentation configuration.

use crate::controllers::{ComponentHealth, HealthResponse, ReadinessResponse};
use storyloop_core::{Category, ErrorResponse, FieldError, StoryStage};
use storyloop_service::{
    AdminTokenRequest, AdminTokenResponse, AnonymousUserResponse, CastVoteRequest, CastVoteResponse,
    CompleteStoryRequest, CreateEpisodeRequest, CreateEpisodeResponse, CreateStoryRequest, CreateStoryResponse,
    CreateSubmissionRequest, CreateSubmissionResponse, CurrentStoryResponse, EpisodeListResponse, EpisodeResponse,
    RegisterIdentityRequest, SessionResponse, SessionStatusResponse, StoryListResponse, StoryResponse,
    StoryStatusResponse, SubmissionListResponse, SubmissionResponse, VoteResponse, VoteStatusResponse,
    WinnerResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI documentation for the Storyloop API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storyloop API",
        version = "1.0.0",
        description = "Collaborative storytelling: submit and vote on phrases that become video episodes",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        crate::controllers::session_controller::session_status,
        crate::controllers::identity_controller::register_identity,
        crate::controllers::identity_controller::get_identity,
        crate::controllers::submission_controller::list_submissions,
        crate::controllers::submission_controller::create_submission,
        crate::controllers::submission_controller::session_winner,
        crate::controllers::vote_controller::vote_status,
        crate::controllers::vote_controller::cast_vote,
        crate::controllers::story_controller::list_stories,
        crate::controllers::story_controller::create_story,
        crate::controllers::story_controller::story_status,
        crate::controllers::story_controller::complete_story,
        crate::controllers::episode_controller::list_episodes,
        crate::controllers::episode_controller::create_episode,
        crate::controllers::admin_controller::issue_token,
        crate::controllers::health_controller::health_check,
        crate::controllers::health_controller::readiness_check,
        crate::controllers::health_controller::liveness_check,
    ),
    components(
        schemas(
            ErrorResponse,
            FieldError,
            Category,
            StoryStage,
            SessionResponse,
            SessionStatusResponse,
            RegisterIdentityRequest,
            AnonymousUserResponse,
            CreateSubmissionRequest,
            CreateSubmissionResponse,
            SubmissionResponse,
            SubmissionListResponse,
            WinnerResponse,
            CastVoteRequest,
            CastVoteResponse,
            VoteResponse,
            VoteStatusResponse,
            CreateStoryRequest,
            CreateStoryResponse,
            CompleteStoryRequest,
            StoryResponse,
            StoryListResponse,
            CurrentStoryResponse,
            StoryStatusResponse,
            CreateEpisodeRequest,
            CreateEpisodeResponse,
            EpisodeResponse,
            EpisodeListResponse,
            AdminTokenRequest,
            AdminTokenResponse,
            HealthResponse,
            ReadinessResponse,
            ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "sessions", description = "Voting session schedule"),
        (name = "identity", description = "Anonymous participants"),
        (name = "submissions", description = "Phrase submissions"),
        (name = "votes", description = "Votes on submissions"),
        (name = "stories", description = "Stories and their progress"),
        (name = "episodes", description = "Generated episodes"),
        (name = "admin", description = "Operator authentication"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Security addon for JWT Bearer authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Admin token from POST /admin/token"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/sessions/status", "/submissions/winner", "/stories/{id}/complete", "/admin/token"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
