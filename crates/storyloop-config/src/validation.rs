//! Configuration validation.
//!
//! Every section is checked and all problems are reported at once so a
//! broken deployment fails on startup with the full list.

use crate::{AppConfig, RateLimitConfig, StorageBackend};
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    /// JWT secret is too short (minimum 32 characters).
    JwtSecretTooShort { actual: usize, minimum: usize },
    /// Port number is invalid.
    InvalidPort { name: String, value: u16 },
    /// Pool size configuration is invalid (min must be <= max).
    InvalidPoolSize { min: u32, max: u32 },
    /// Pool size exceeds maximum allowed.
    PoolSizeTooLarge { value: u32, maximum: u32 },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Sampling ratio must be between 0.0 and 1.0.
    InvalidSamplingRatio { value: f64 },
    /// Timeout or window must be positive.
    NonPositiveDuration { name: String },
    /// Duration exceeds the largest supported value.
    DurationTooLong { name: String, value: u64, maximum: u64 },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
    /// Log format is invalid.
    InvalidLogFormat { value: String },
    /// Schedule offset is out of range.
    InvalidUtcOffset { minutes: i32 },
    /// A participation limit of zero would block everyone.
    ZeroLimit { name: String },
    /// The admin key hash is not a PHC string.
    InvalidAdminKeyHash,
    /// IP salt must be set.
    EmptyIpSalt,
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JwtSecretTooShort { actual, minimum } => {
                write!(f, "JWT secret too short: {} characters (minimum {})", actual, minimum)
            }
            Self::InvalidPort { name, value } => {
                write!(f, "Invalid port for {}: {} (must be 1-65535)", name, value)
            }
            Self::InvalidPoolSize { min, max } => {
                write!(f, "Invalid pool size: min ({}) cannot be greater than max ({})", min, max)
            }
            Self::PoolSizeTooLarge { value, maximum } => {
                write!(f, "Pool size {} exceeds maximum allowed ({})", value, maximum)
            }
            Self::InvalidUrl { url_type, message } => write!(f, "Invalid {} URL: {}", url_type, message),
            Self::InvalidSamplingRatio { value } => {
                write!(f, "Invalid sampling ratio: {} (must be between 0.0 and 1.0)", value)
            }
            Self::NonPositiveDuration { name } => write!(f, "'{}' must be positive", name),
            Self::DurationTooLong { name, value, maximum } => {
                write!(f, "'{}' is {} seconds (maximum {})", name, value, maximum)
            }
            Self::InvalidLogLevel { value } => {
                write!(f, "Invalid log level: '{}' (valid: trace, debug, info, warn, error)", value)
            }
            Self::InvalidLogFormat { value } => write!(f, "Invalid log format: '{}' (valid: json, pretty)", value),
            Self::InvalidUtcOffset { minutes } => {
                write!(f, "Invalid voting.utc_offset_minutes: {} (must be within +/- 1439)", minutes)
            }
            Self::ZeroLimit { name } => write!(f, "'{}' must be at least 1", name),
            Self::InvalidAdminKeyHash => write!(f, "security.admin_key_hash is not an argon2 PHC string"),
            Self::EmptyIpSalt => write!(f, "security.ip_salt must not be empty"),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Minimum JWT secret length.
    const MIN_JWT_SECRET_LENGTH: usize = 32;
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: u32 = 1000;
    /// Largest schedule offset in minutes.
    const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];
    const VALID_LOG_FORMATS: &'static [&'static str] = &["json", "pretty"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_security(config, &mut errors);
        Self::validate_server(config, &mut errors);
        Self::validate_database(config, &mut errors);
        Self::validate_redis(config, &mut errors);
        Self::validate_voting(config, &mut errors);
        Self::validate_rate_limit(config, &mut errors);
        Self::validate_observability(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_security(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let security = &config.security;
        if security.jwt_secret.len() < Self::MIN_JWT_SECRET_LENGTH {
            errors.push(ConfigValidationError::JwtSecretTooShort {
                actual: security.jwt_secret.len(),
                minimum: Self::MIN_JWT_SECRET_LENGTH,
            });
        }
        if security.jwt_access_expiration_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveDuration {
                name: "security.jwt_access_expiration_secs".to_string(),
            });
        }
        if let Some(hash) = &security.admin_key_hash {
            if !hash.starts_with("$argon2") {
                errors.push(ConfigValidationError::InvalidAdminKeyHash);
            }
        }
        if security.ip_salt.is_empty() {
            errors.push(ConfigValidationError::EmptyIpSalt);
        }
    }

    fn validate_server(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.server.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                name: "server.port".to_string(),
                value: config.server.port,
            });
        }
        if config.server.request_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveDuration {
                name: "server.request_timeout_secs".to_string(),
            });
        }
    }

    fn validate_database(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let database = &config.database;
        if database.backend != StorageBackend::Postgres {
            return;
        }

        if !database.url.starts_with("postgres://") && !database.url.starts_with("postgresql://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL must start with postgres:// or postgresql://".to_string(),
            });
        }
        if database.min_connections > database.max_connections {
            errors.push(ConfigValidationError::InvalidPoolSize {
                min: database.min_connections,
                max: database.max_connections,
            });
        }
        if database.max_connections > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: database.max_connections,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
        if database.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveDuration {
                name: "database.connect_timeout_secs".to_string(),
            });
        }
    }

    fn validate_redis(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let redis = &config.redis;
        if !redis.enabled {
            return;
        }
        if !redis.url.starts_with("redis://") && !redis.url.starts_with("rediss://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            });
        }
        if redis.pool_size > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: redis.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
    }

    fn validate_voting(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let minutes = config.voting.utc_offset_minutes;
        if !(-Self::MAX_OFFSET_MINUTES..=Self::MAX_OFFSET_MINUTES).contains(&minutes) {
            errors.push(ConfigValidationError::InvalidUtcOffset { minutes });
        }
    }

    fn validate_rate_limit(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let limits = &config.rate_limit;
        if !limits.enabled {
            return;
        }
        for (name, value) in [
            ("rate_limit.submissions_per_session", limits.submissions_per_session),
            ("rate_limit.votes_per_session", limits.votes_per_session),
        ] {
            if value == 0 {
                errors.push(ConfigValidationError::ZeroLimit { name: name.to_string() });
            }
        }
        for (name, value) in [
            ("rate_limit.window_secs", limits.window_secs),
            ("rate_limit.cleanup_interval_secs", limits.cleanup_interval_secs),
        ] {
            if value == 0 {
                errors.push(ConfigValidationError::NonPositiveDuration { name: name.to_string() });
            } else if value > RateLimitConfig::MAX_WINDOW_SECS {
                errors.push(ConfigValidationError::DurationTooLong {
                    name: name.to_string(),
                    value,
                    maximum: RateLimitConfig::MAX_WINDOW_SECS,
                });
            }
        }
    }

    fn validate_observability(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let observability = &config.observability;
        let level = observability.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: observability.log_level.clone(),
            });
        }
        let format = observability.log_format.to_lowercase();
        if !Self::VALID_LOG_FORMATS.contains(&format.as_str()) {
            errors.push(ConfigValidationError::InvalidLogFormat {
                value: observability.log_format.clone(),
            });
        }
        if !(0.0..=1.0).contains(&observability.sampling_ratio) {
            errors.push(ConfigValidationError::InvalidSamplingRatio {
                value: observability.sampling_ratio,
            });
        }
        if let Some(endpoint) = &observability.otlp_endpoint {
            if Url::parse(endpoint).is_err() {
                errors.push(ConfigValidationError::InvalidUrl {
                    url_type: "otlp_endpoint".to_string(),
                    message: format!("Invalid URL format: {}", endpoint),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigValidator::validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_problem() {
        let mut config = AppConfig::default();
        config.security.jwt_secret = "short".to_string();
        config.server.port = 0;
        config.voting.utc_offset_minutes = 2000;
        config.observability.log_format = "xml".to_string();

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ConfigValidationError::InvalidUtcOffset { minutes: 2000 }));
    }

    #[test]
    fn test_memory_backend_skips_database_checks() {
        let mut config = AppConfig::default();
        config.database.backend = StorageBackend::Memory;
        config.database.url = String::new();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_admin_key_hash_must_be_argon2() {
        let mut config = AppConfig::default();
        config.security.admin_key_hash = Some("plaintext".to_string());
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors, vec![ConfigValidationError::InvalidAdminKeyHash]);
    }

    #[test]
    fn test_zero_participation_limit_is_rejected() {
        let mut config = AppConfig::default();
        config.rate_limit.votes_per_session = 0;
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors[0].to_string(), "'rate_limit.votes_per_session' must be at least 1");
    }

    #[test]
    fn test_oversized_window_is_rejected() {
        let mut config = AppConfig::default();
        config.rate_limit.window_secs = 10_000_000_000_000_000;
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigValidationError::DurationTooLong {
                name: "rate_limit.window_secs".to_string(),
                value: 10_000_000_000_000_000,
                maximum: RateLimitConfig::MAX_WINDOW_SECS,
            }]
        );

        config.rate_limit.window_secs = RateLimitConfig::MAX_WINDOW_SECS;
        assert!(ConfigValidator::validate(&config).is_ok());
    }
}
