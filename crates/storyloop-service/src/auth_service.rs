//! Admin authentication service.

use crate::dto::{AdminTokenRequest, AdminTokenResponse};
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use storyloop_config::SecurityConfig;
use storyloop_core::{Interface, StoryError, StoryResult};
use storyloop_security::{AdminKeyHasher, Claims, TokenProvider};
use tracing::{info, warn};

/// Subject of tokens issued for the operator key.
const ADMIN_SUBJECT: &str = "admin";

/// Authentication service trait.
#[async_trait]
pub trait AuthService: Interface + Send + Sync {
    /// Exchanges the operator key for an admin token.
    async fn issue_token(&self, request: AdminTokenRequest) -> StoryResult<AdminTokenResponse>;

    /// Validates an admin token and returns its claims.
    async fn validate(&self, token: &str) -> StoryResult<Claims>;
}

/// Authentication service implementation.
#[derive(Component)]
#[shaku(interface = AuthService)]
pub struct AuthServiceImpl {
    hasher: AdminKeyHasher,
    token_provider: Arc<TokenProvider>,
    admin_key_hash: Option<String>,
}

impl AuthServiceImpl {
    /// Creates a new authentication service.
    pub fn new(security_config: Arc<SecurityConfig>) -> Self {
        let AuthServiceImplParameters {
            hasher,
            token_provider,
            admin_key_hash,
        } = AuthServiceImplParameters::from_config(security_config);
        Self {
            hasher,
            token_provider,
            admin_key_hash,
        }
    }
}

impl AuthServiceImplParameters {
    /// Component parameters derived from the security settings.
    pub fn from_config(security_config: Arc<SecurityConfig>) -> Self {
        let admin_key_hash = security_config.admin_key_hash.clone();
        if admin_key_hash.is_none() {
            warn!("No admin key hash configured, admin endpoints are closed");
        }
        Self {
            hasher: AdminKeyHasher::new(),
            token_provider: Arc::new(TokenProvider::new(security_config)),
            admin_key_hash,
        }
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn issue_token(&self, request: AdminTokenRequest) -> StoryResult<AdminTokenResponse> {
        let (Some(key), Some(hash)) = (request.admin_key.as_deref(), self.admin_key_hash.as_deref()) else {
            return Err(StoryError::InvalidCredentials);
        };
        if key.is_empty() || !self.hasher.verify(key, hash)? {
            warn!("Rejected admin token request");
            return Err(StoryError::InvalidCredentials);
        }

        let issued = self.token_provider.issue_admin_token(ADMIN_SUBJECT)?;
        info!("Issued admin token expiring at {}", issued.expires_at);
        Ok(AdminTokenResponse {
            access_token: issued.access_token,
            token_type: issued.token_type,
            expires_in: self.token_provider.expires_in_secs(),
            expires_at: issued.expires_at,
        })
    }

    async fn validate(&self, token: &str) -> StoryResult<Claims> {
        self.token_provider.validate_admin_token(token)
    }
}
