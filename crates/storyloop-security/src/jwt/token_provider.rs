//! JWT token provider for creating and validating tokens.

use super::Claims;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use storyloop_config::SecurityConfig;
use storyloop_core::{StoryError, StoryResult};
use tracing::{debug, warn};

/// A signed token and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    /// Always "Bearer".
    pub token_type: String,
}

/// JWT token provider service.
#[derive(Clone)]
pub struct TokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: Arc<SecurityConfig>,
    validation: Validation,
}

impl TokenProvider {
    /// Creates a new token provider.
    #[must_use]
    pub fn new(config: Arc<SecurityConfig>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.jwt_issuer]);
        validation.set_audience(&[&config.jwt_audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Self {
            encoding_key,
            decoding_key,
            config,
            validation,
        }
    }

    /// Issues an admin token for `subject`.
    pub fn issue_admin_token(&self, subject: &str) -> StoryResult<IssuedToken> {
        let now = Utc::now();
        let lifetime = i64::try_from(self.config.jwt_access_expiration_secs).unwrap_or(i64::MAX / 1000);
        let expires_at = now + Duration::seconds(lifetime);

        let claims = Claims::admin(
            subject,
            self.config.jwt_issuer.clone(),
            self.config.jwt_audience.clone(),
            now,
            expires_at,
        );

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| StoryError::Internal(format!("Failed to generate access token: {}", e)))?;

        debug!("Issued admin token {}", claims.jti);
        Ok(IssuedToken {
            access_token: token,
            expires_at,
            token_type: "Bearer".to_string(),
        })
    }

    /// Validates a token and returns the claims.
    pub fn validate_token(&self, token: &str) -> StoryResult<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            warn!("Token validation failed: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => StoryError::TokenExpired,
                ErrorKind::InvalidToken | ErrorKind::InvalidSignature => {
                    StoryError::InvalidToken("Invalid token signature".to_string())
                }
                ErrorKind::InvalidIssuer => StoryError::InvalidToken("Invalid token issuer".to_string()),
                ErrorKind::InvalidAudience => StoryError::InvalidToken("Invalid token audience".to_string()),
                _ => StoryError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Validates a token and requires the admin role.
    pub fn validate_admin_token(&self, token: &str) -> StoryResult<Claims> {
        let claims = self.validate_token(token)?;
        if !claims.is_admin() {
            return Err(StoryError::forbidden("Admin role required"));
        }
        Ok(claims)
    }

    /// Token lifetime in seconds.
    #[must_use]
    pub fn expires_in_secs(&self) -> u64 {
        self.config.jwt_access_expiration_secs
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("issuer", &self.config.jwt_issuer)
            .field("audience", &self.config.jwt_audience)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_with(issuer: &str, audience: &str) -> TokenProvider {
        let config = SecurityConfig {
            jwt_secret: "test-secret-key-for-testing-only-32chars".to_string(),
            jwt_access_expiration_secs: 3600,
            jwt_issuer: issuer.to_string(),
            jwt_audience: audience.to_string(),
            ..Default::default()
        };
        TokenProvider::new(Arc::new(config))
    }

    #[test]
    fn test_issue_and_validate_admin_token() {
        let provider = provider_with("test-issuer", "test-audience");
        let issued = provider.issue_admin_token("admin").unwrap();
        assert_eq!(issued.token_type, "Bearer");

        let claims = provider.validate_admin_token(&issued.access_token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_rejects_foreign_audience() {
        let issued = provider_with("test-issuer", "other").issue_admin_token("admin").unwrap();
        let err = provider_with("test-issuer", "test-audience")
            .validate_token(&issued.access_token)
            .unwrap_err();
        assert!(matches!(err, StoryError::InvalidToken(_)));
    }

    #[test]
    fn test_rejects_garbage() {
        let err = provider_with("i", "a").validate_token("not-a-jwt").unwrap_err();
        assert!(matches!(err, StoryError::InvalidToken(_)));
    }
}
