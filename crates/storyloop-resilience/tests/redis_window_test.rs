//! Integration tests for the Redis window store.
//!
//! These tests run against a real Redis server using testcontainers.
//! Requires Docker to be available on the system.

use chrono::{Duration, Utc};
use redis::AsyncCommands;
use std::sync::Arc;
use storyloop_config::RedisConfig;
use storyloop_resilience::{create_redis_pool, RedisWindowStore, WindowRateLimiter};
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::redis::{Redis, REDIS_PORT};

struct TestRedis {
    _container: ContainerAsync<Redis>,
    pool: Arc<deadpool_redis::Pool>,
}

impl TestRedis {
    async fn new() -> Self {
        let container = Redis::default().start().await.expect("Failed to start Redis container");
        let port = container
            .get_host_port_ipv4(REDIS_PORT)
            .await
            .expect("Failed to get Redis port");

        let config = RedisConfig {
            url: format!("redis://127.0.0.1:{}", port),
            pool_size: 2,
            enabled: true,
        };
        let pool = create_redis_pool(&config).await.expect("Failed to connect to Redis");

        Self {
            _container: container,
            pool,
        }
    }

    fn store(&self) -> RedisWindowStore {
        RedisWindowStore::new(Arc::clone(&self.pool))
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_counts_and_denies_within_window() {
    let redis = TestRedis::new().await;
    let store = redis.store();
    let window = Duration::hours(24);

    let first = store.check("vote:ip:2024-05-01:2", 1, window).await.unwrap();
    assert!(first.allowed);
    assert_eq!(first.remaining, 0);
    assert!(first.reset_at > Utc::now() + Duration::hours(23));

    let second = store.check("vote:ip:2024-05-01:2", 1, window).await.unwrap();
    assert!(!second.allowed);
    assert_eq!(second.count, 2);

    assert!(store.check("vote:other:2024-05-01:2", 1, window).await.unwrap().allowed);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_first_hit_sets_expiry() {
    let redis = TestRedis::new().await;
    let store = redis.store();

    store.check("submit:ip:2024-05-01:0", 1, Duration::minutes(10)).await.unwrap();

    let mut conn = redis.pool.get().await.unwrap();
    let ttl_ms: i64 = conn.pttl("storyloop:ratelimit:submit:ip:2024-05-01:0").await.unwrap();
    assert!(ttl_ms > 0 && ttl_ms <= 600_000);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_counter_without_expiry_is_repaired() {
    let redis = TestRedis::new().await;
    let store = redis.store();
    let key = "storyloop:ratelimit:submit:stale:2024-05-01:1";

    let mut conn = redis.pool.get().await.unwrap();
    let _: () = conn.set(key, 3).await.unwrap();
    let before: i64 = conn.pttl(key).await.unwrap();
    assert_eq!(before, -1);

    let decision = store.check("submit:stale:2024-05-01:1", 5, Duration::minutes(5)).await.unwrap();
    assert_eq!(decision.count, 4);

    let after: i64 = conn.pttl(key).await.unwrap();
    assert!(after > 0 && after <= 300_000);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_health_check_pings() {
    let redis = TestRedis::new().await;
    let store = redis.store();
    assert!(storyloop_core::HealthCheck::check(&store).await.is_healthy());
}
