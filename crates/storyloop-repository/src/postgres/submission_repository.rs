//! PostgreSQL submission repository.

use super::{to_i32, to_u32};
use crate::{traits::SubmissionRepository, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shaku::Component;
use sqlx::FromRow;
use std::sync::Arc;
use storyloop_core::{AnonymousUserId, SessionKey, SessionSlot, StoryError, StoryResult, Submission, SubmissionId};
use tracing::debug;
use uuid::Uuid;

const COLUMNS: &str =
    "id, phrase, word_count, session_date, session_time, anonymous_user_id, ip_hash, votes, created_at";

/// PostgreSQL submission repository.
#[derive(Clone, Component)]
#[shaku(interface = SubmissionRepository)]
pub struct PgSubmissionRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgSubmissionRepository {
    /// Creates a repository on `pool`.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SubmissionRow {
    id: Uuid,
    phrase: String,
    word_count: i32,
    session_date: NaiveDate,
    session_time: i16,
    anonymous_user_id: Uuid,
    ip_hash: Option<String>,
    votes: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = StoryError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SubmissionId::from_uuid(row.id),
            phrase: row.phrase,
            word_count: to_u32(row.word_count, "word_count")?,
            session_date: row.session_date,
            session_time: SessionSlot::try_from(row.session_time)?,
            anonymous_user_id: AnonymousUserId::from_uuid(row.anonymous_user_id),
            ip_hash: row.ip_hash,
            votes: to_u32(row.votes, "votes")?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl SubmissionRepository for PgSubmissionRepository {
    async fn find_by_id(&self, id: SubmissionId) -> StoryResult<Option<Submission>> {
        debug!("Finding submission by id: {}", id);

        let row = sqlx::query_as::<_, SubmissionRow>(&format!("SELECT {COLUMNS} FROM submissions WHERE id = $1"))
            .bind(id.into_inner())
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(Submission::try_from).transpose()
    }

    async fn find_by_session(&self, session: SessionKey) -> StoryResult<Vec<Submission>> {
        debug!("Finding submissions for session {}", session);

        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM submissions
            WHERE session_date = $1 AND session_time = $2
            ORDER BY votes DESC, created_at ASC, id ASC
            "#
        ))
        .bind(session.date)
        .bind(i16::from(session.slot))
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(Submission::try_from).collect()
    }

    async fn find_top_by_session(&self, session: SessionKey) -> StoryResult<Option<Submission>> {
        debug!("Finding top submission for session {}", session);

        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM submissions
            WHERE session_date = $1 AND session_time = $2
            ORDER BY votes DESC, created_at ASC, id ASC
            LIMIT 1
            "#
        ))
        .bind(session.date)
        .bind(i16::from(session.slot))
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(Submission::try_from).transpose()
    }

    async fn find_by_author(&self, session: SessionKey, author: AnonymousUserId) -> StoryResult<Option<Submission>> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM submissions
            WHERE session_date = $1 AND session_time = $2 AND anonymous_user_id = $3
            "#
        ))
        .bind(session.date)
        .bind(i16::from(session.slot))
        .bind(author.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(Submission::try_from).transpose()
    }

    async fn save(&self, submission: &Submission) -> StoryResult<Submission> {
        debug!("Saving submission {} for session {}", submission.id, submission.session());

        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            r#"
            INSERT INTO submissions ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(submission.id.into_inner())
        .bind(&submission.phrase)
        .bind(to_i32(submission.word_count, "word_count")?)
        .bind(submission.session_date)
        .bind(i16::from(submission.session_time))
        .bind(submission.anonymous_user_id.into_inner())
        .bind(&submission.ip_hash)
        .bind(to_i32(submission.votes, "votes")?)
        .bind(submission.created_at)
        .fetch_one(self.pool.inner())
        .await?;

        Submission::try_from(row)
    }
}
