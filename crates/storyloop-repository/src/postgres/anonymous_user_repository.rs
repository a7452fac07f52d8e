//! PostgreSQL anonymous user repository.

use crate::{traits::AnonymousUserRepository, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shaku::Component;
use sqlx::FromRow;
use std::sync::Arc;
use storyloop_core::{AnonymousUser, AnonymousUserId, StoryResult};
use tracing::debug;
use uuid::Uuid;

/// PostgreSQL anonymous user repository.
#[derive(Clone, Component)]
#[shaku(interface = AnonymousUserRepository)]
pub struct PgAnonymousUserRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgAnonymousUserRepository {
    /// Creates a repository on `pool`.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AnonymousUserRow {
    id: Uuid,
    fingerprint: String,
    first_seen: DateTime<Utc>,
    last_active: DateTime<Utc>,
}

impl From<AnonymousUserRow> for AnonymousUser {
    fn from(row: AnonymousUserRow) -> Self {
        Self {
            id: AnonymousUserId::from_uuid(row.id),
            fingerprint: row.fingerprint,
            first_seen: row.first_seen,
            last_active: row.last_active,
        }
    }
}

#[async_trait]
impl AnonymousUserRepository for PgAnonymousUserRepository {
    async fn upsert_by_fingerprint(&self, fingerprint: &str, now: DateTime<Utc>) -> StoryResult<AnonymousUser> {
        debug!("Upserting anonymous user by fingerprint");

        let candidate = AnonymousUser::new(fingerprint, now);
        let row = sqlx::query_as::<_, AnonymousUserRow>(
            r#"
            INSERT INTO anonymous_users (id, fingerprint, first_seen, last_active)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT (fingerprint) DO UPDATE SET last_active = EXCLUDED.last_active
            RETURNING id, fingerprint, first_seen, last_active
            "#,
        )
        .bind(candidate.id.into_inner())
        .bind(&candidate.fingerprint)
        .bind(now)
        .fetch_one(self.pool.inner())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: AnonymousUserId) -> StoryResult<Option<AnonymousUser>> {
        debug!("Finding anonymous user by id: {}", id);

        let row = sqlx::query_as::<_, AnonymousUserRow>(
            "SELECT id, fingerprint, first_seen, last_active FROM anonymous_users WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(Into::into))
    }
}
