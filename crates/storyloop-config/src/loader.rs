//! Configuration loader with layered sources.

use crate::{AppConfig, ConfigValidator, StorageBackend};
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use std::sync::Arc;
use storyloop_core::StoryError;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Prefix of environment overrides, e.g. `STORYLOOP__SERVER__PORT`.
pub const ENV_PREFIX: &str = "STORYLOOP";

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Untracked local overrides
    /// 4. Environment variables with `STORYLOOP__` prefix
    pub fn new(config_dir: impl Into<String>) -> Result<Self, StoryError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, StoryError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    pub async fn reload(&self) -> Result<(), StoryError> {
        let new_config = Self::load_config(&self.config_dir)?;
        *self.config.write().await = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    fn load_config(config_dir: &str) -> Result<AppConfig, StoryError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let env_override = std::env::var("APP_ENV").ok();
        let environment = env_override.clone().unwrap_or_else(|| "development".to_string());
        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();
        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{}/{}.toml", config_dir, name);
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.cors_origins")
                .try_parsing(true),
        );

        let mut app_config: AppConfig = builder
            .build()
            .and_then(|config| config.try_deserialize::<AppConfig>())
            .map_err(config_error_to_story_error)?;

        if let Some(environment) = env_override {
            app_config.app.environment = environment;
        }

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    fn validate_config(config: &AppConfig) -> Result<(), StoryError> {
        if config.app.is_production() && config.security.jwt_secret.starts_with("change-me") {
            warn!("Using default JWT secret in production! This is a security risk.");
        }
        if config.database.backend == StorageBackend::Memory && config.app.is_production() {
            warn!("In-memory storage configured in production; data will not survive a restart");
        }
        if config.security.admin_key_hash.is_none() {
            warn!("No admin key hash configured; admin endpoints will reject every request");
        }

        ConfigValidator::validate(config).map_err(|errors| {
            let joined = errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
            StoryError::Configuration(joined)
        })
    }

    /// Gets a specific configuration value by key path.
    pub async fn get_value<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let config = self.config.read().await;
        let json = serde_json::to_value(&*config).ok()?;

        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }

        serde_json::from_value(current.clone()).ok()
    }
}

fn config_error_to_story_error(err: ConfigError) -> StoryError {
    StoryError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_layers_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[server]\nport = 9000\n\n[database]\nbackend = \"memory\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("local.toml"), "[voting]\nutc_offset_minutes = 60\n").unwrap();

        let loader = ConfigLoader::new(dir.path().to_string_lossy().to_string()).unwrap();
        let config = loader.get().await;
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.backend, StorageBackend::Memory);
        assert_eq!(config.voting.utc_offset_minutes, 60);
        assert_eq!(config.rate_limit.votes_per_session, 1);
    }

    #[tokio::test]
    async fn test_get_value_by_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[server]\nport = 9100\n").unwrap();

        let loader = ConfigLoader::new(dir.path().to_string_lossy().to_string()).unwrap();
        assert_eq!(loader.get_value::<u16>("server.port").await, Some(9100));
        assert_eq!(loader.get_value::<u16>("server.nope").await, None);
    }

    #[tokio::test]
    async fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[server]\nport = 0\n").unwrap();

        let err = ConfigLoader::new(dir.path().to_string_lossy().to_string()).err().unwrap();
        assert!(err.to_string().contains("port"));
    }

    #[tokio::test]
    async fn test_reload_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("default.toml");
        fs::write(&file, "[server]\nport = 9200\n").unwrap();
        let loader = ConfigLoader::new(dir.path().to_string_lossy().to_string()).unwrap();

        fs::write(&file, "[server]\nport = 9201\n").unwrap();
        loader.reload().await.unwrap();
        assert_eq!(loader.get().await.server.port, 9201);
    }
}
