//! Redis window store.

use super::{RateDecision, WindowRateLimiter};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use std::sync::Arc;
use storyloop_config::RedisConfig;
use storyloop_core::{HealthCheck, HealthStatus, StoryError, StoryResult};
use tracing::{debug, info};

const KEY_PREFIX: &str = "storyloop:ratelimit";

/// Creates a Redis connection pool and checks it answers `PING`.
pub async fn create_redis_pool(config: &RedisConfig) -> StoryResult<Arc<Pool>> {
    info!("Creating Redis connection pool for rate limiting...");

    let pool = Config::from_url(&config.url)
        .builder()
        .map_err(|e| StoryError::Configuration(format!("Invalid Redis config: {}", e)))?
        .max_size(config.pool_size as usize)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| StoryError::Configuration(format!("Failed to create Redis pool: {}", e)))?;

    let mut conn = pool
        .get()
        .await
        .map_err(|e| StoryError::Cache(format!("Failed to get Redis connection: {}", e)))?;
    redis::cmd("PING")
        .query_async::<String>(&mut *conn)
        .await
        .map_err(|e| StoryError::Cache(format!("Redis PING failed: {}", e)))?;

    info!("Redis connection pool created successfully");
    Ok(Arc::new(pool))
}

/// Window counters shared between instances through Redis.
///
/// Each key is an integer counter (`INCR`) that expires with its window.
/// A key found without a TTL gets one on its next hit.
#[derive(Clone)]
pub struct RedisWindowStore {
    pool: Arc<Pool>,
}

impl RedisWindowStore {
    /// Creates a store on `pool`.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool }
    }

    async fn get_conn(&self) -> StoryResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| StoryError::Cache(format!("Failed to get Redis connection: {}", e)))
    }
}

impl std::fmt::Debug for RedisWindowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisWindowStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl WindowRateLimiter for RedisWindowStore {
    async fn check(&self, key: &str, max: u32, window: Duration) -> StoryResult<RateDecision> {
        let key = format!("{}:{}", KEY_PREFIX, key);
        let mut conn = self.get_conn().await?;

        let window_ms = window.num_milliseconds().max(1);
        let (count, mut ttl_ms): (i64, i64) = redis::pipe()
            .atomic()
            .incr(&key, 1)
            .pttl(&key)
            .query_async(&mut *conn)
            .await
            .map_err(|e| StoryError::Cache(format!("Failed to increment '{}': {}", key, e)))?;

        // No TTL: either a new window or one whose expiry was never set.
        if ttl_ms < 0 {
            let _: () = conn
                .pexpire(&key, window_ms)
                .await
                .map_err(|e| StoryError::Cache(format!("Failed to expire '{}': {}", key, e)))?;
            ttl_ms = window_ms;
        }
        let reset_at = Utc::now()
            .checked_add_signed(Duration::milliseconds(ttl_ms))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let count = u32::try_from(count).unwrap_or(u32::MAX);
        debug!("Rate limit key '{}' at {}/{}", key, count, max);
        Ok(RateDecision::new(count, max, reset_at))
    }
}

#[async_trait]
impl HealthCheck for RedisWindowStore {
    fn name(&self) -> &str {
        "redis"
    }

    async fn check(&self) -> HealthStatus {
        let mut conn = match self.pool.get().await {
            Ok(conn) => conn,
            Err(e) => return HealthStatus::Unhealthy(format!("Failed to get Redis connection: {e}")),
        };
        match redis::cmd("PING").query_async::<String>(&mut *conn).await {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(format!("Redis PING failed: {e}")),
        }
    }
}
