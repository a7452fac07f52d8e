//! PostgreSQL vote repository.

use crate::{traits::VoteRepository, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shaku::Component;
use sqlx::FromRow;
use std::sync::Arc;
use storyloop_core::{AnonymousUserId, SessionKey, SessionSlot, StoryError, StoryResult, SubmissionId, Vote, VoteId};
use tracing::debug;
use uuid::Uuid;

/// PostgreSQL vote repository.
#[derive(Clone, Component)]
#[shaku(interface = VoteRepository)]
pub struct PgVoteRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgVoteRepository {
    /// Creates a repository on `pool`.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct VoteRow {
    id: Uuid,
    submission_id: Uuid,
    anonymous_user_id: Uuid,
    session_date: NaiveDate,
    session_time: i16,
    created_at: DateTime<Utc>,
}

impl TryFrom<VoteRow> for Vote {
    type Error = StoryError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: VoteId::from_uuid(row.id),
            submission_id: SubmissionId::from_uuid(row.submission_id),
            anonymous_user_id: AnonymousUserId::from_uuid(row.anonymous_user_id),
            session_date: row.session_date,
            session_time: SessionSlot::try_from(row.session_time)?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl VoteRepository for PgVoteRepository {
    async fn find_by_voter(&self, session: SessionKey, voter: AnonymousUserId) -> StoryResult<Option<Vote>> {
        let row = sqlx::query_as::<_, VoteRow>(
            r#"
            SELECT id, submission_id, anonymous_user_id, session_date, session_time, created_at
            FROM votes
            WHERE session_date = $1 AND session_time = $2 AND anonymous_user_id = $3
            "#,
        )
        .bind(session.date)
        .bind(i16::from(session.slot))
        .bind(voter.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(Vote::try_from).transpose()
    }

    async fn cast(&self, vote: &Vote) -> StoryResult<Vote> {
        debug!("Casting vote {} for submission {}", vote.id, vote.submission_id);

        let mut tx = self.pool.inner().begin().await?;

        let updated = sqlx::query("UPDATE submissions SET votes = votes + 1 WHERE id = $1")
            .bind(vote.submission_id.into_inner())
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(StoryError::not_found("Submission", vote.submission_id));
        }

        let row = sqlx::query_as::<_, VoteRow>(
            r#"
            INSERT INTO votes (id, submission_id, anonymous_user_id, session_date, session_time, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, submission_id, anonymous_user_id, session_date, session_time, created_at
            "#,
        )
        .bind(vote.id.into_inner())
        .bind(vote.submission_id.into_inner())
        .bind(vote.anonymous_user_id.into_inner())
        .bind(vote.session_date)
        .bind(i16::from(vote.session_time))
        .bind(vote.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Vote::try_from(row)
    }
}
