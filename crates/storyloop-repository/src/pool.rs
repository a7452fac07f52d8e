//! Database connection pool management.

use async_trait::async_trait;
use backoff::ExponentialBackoff;
use shaku::Component;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use storyloop_config::DatabaseConfig;
use storyloop_core::{HealthCheck, HealthStatus, Interface, StoryError, StoryResult};
use tracing::{info, warn};

/// Pool handle injected into the PostgreSQL repositories.
#[async_trait]
pub trait DatabasePoolInterface: Interface + Send + Sync {
    /// Returns the underlying pool.
    fn inner(&self) -> &PgPool;

    /// Closes the pool.
    async fn close(&self);
}

/// PostgreSQL pool wrapper.
#[derive(Component)]
#[shaku(interface = DatabasePoolInterface)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Connects using `config`, retrying with exponential backoff until the
    /// connect timeout has elapsed.
    pub async fn connect(config: &DatabaseConfig) -> StoryResult<Self> {
        info!("Connecting to PostgreSQL database...");

        let mut options = PgConnectOptions::from_str(&config.url)
            .map_err(|e| StoryError::Configuration(format!("Invalid database URL: {}", e)))?;
        if !config.log_queries {
            options = options.disable_statement_logging();
        }

        let policy = ExponentialBackoff {
            initial_interval: Duration::from_millis(250),
            max_interval: Duration::from_secs(5),
            max_elapsed_time: Some(config.connect_timeout()),
            ..ExponentialBackoff::default()
        };

        let pool = backoff::future::retry(policy, || {
            let options = options.clone();
            async move {
                PgPoolOptions::new()
                    .min_connections(config.min_connections)
                    .max_connections(config.max_connections)
                    .acquire_timeout(config.connect_timeout())
                    .idle_timeout(Some(config.idle_timeout()))
                    .connect_with(options)
                    .await
                    .map_err(|e| {
                        warn!("Failed to connect to database: {}", e);
                        backoff::Error::transient(e)
                    })
            }
        })
        .await
        .map_err(|e| StoryError::Database(format!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the underlying pool.
    #[must_use]
    pub fn inner(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the embedded migrations.
    pub async fn run_migrations(&self) -> StoryResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoryError::Database(format!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Closes the pool.
    pub async fn close(&self) {
        info!("Closing database connection pool...");
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

#[async_trait]
impl DatabasePoolInterface for DatabasePool {
    fn inner(&self) -> &PgPool {
        &self.pool
    }

    async fn close(&self) {
        Self::close(self).await;
    }
}

#[async_trait]
impl HealthCheck for DatabasePool {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn check(&self) -> HealthStatus {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(format!("Health check failed: {}", e)),
        }
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("size", &self.pool.size())
            .field("num_idle", &self.pool.num_idle())
            .finish()
    }
}

/// Connects and wraps the pool for sharing between repositories.
pub async fn create_pool(config: &DatabaseConfig) -> StoryResult<Arc<DatabasePool>> {
    Ok(Arc::new(DatabasePool::connect(config).await?))
}
