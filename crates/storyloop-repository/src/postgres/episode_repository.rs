//! PostgreSQL episode repository.

use super::{to_i32, to_u32};
use crate::{traits::EpisodeRepository, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shaku::Component;
use sqlx::FromRow;
use std::sync::Arc;
use storyloop_core::{Episode, EpisodeId, Story, StoryError, StoryId, StoryResult};
use tracing::{debug, warn};
use uuid::Uuid;

const COLUMNS: &str =
    "id, story_id, episode_number, video_url, duration_seconds, winning_phrase, story_prompt, created_at";

/// PostgreSQL episode repository.
#[derive(Clone, Component)]
#[shaku(interface = EpisodeRepository)]
pub struct PgEpisodeRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgEpisodeRepository {
    /// Creates a repository on `pool`.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EpisodeRow {
    id: Uuid,
    story_id: Uuid,
    episode_number: i32,
    video_url: Option<String>,
    duration_seconds: Option<i32>,
    winning_phrase: String,
    story_prompt: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<EpisodeRow> for Episode {
    type Error = StoryError;

    fn try_from(row: EpisodeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EpisodeId::from_uuid(row.id),
            story_id: StoryId::from_uuid(row.story_id),
            episode_number: to_u32(row.episode_number, "episode_number")?,
            video_url: row.video_url,
            duration_seconds: row.duration_seconds.map(|d| to_u32(d, "duration_seconds")).transpose()?,
            winning_phrase: row.winning_phrase,
            story_prompt: row.story_prompt,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl EpisodeRepository for PgEpisodeRepository {
    async fn find_by_story(&self, story_id: StoryId, limit: Option<u32>) -> StoryResult<Vec<Episode>> {
        debug!("Finding episodes of story {}", story_id);

        let limit = limit.map(i64::from);
        let rows = sqlx::query_as::<_, EpisodeRow>(&format!(
            "SELECT {COLUMNS} FROM episodes WHERE story_id = $1 ORDER BY episode_number ASC LIMIT $2"
        ))
        .bind(story_id.into_inner())
        .bind(limit)
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(Episode::try_from).collect()
    }

    async fn append(&self, story: &Story, episode: &Episode) -> StoryResult<Episode> {
        debug!("Appending episode {} to story {}", episode.episode_number, story.id);

        let mut tx = self.pool.inner().begin().await?;

        // Guarded on the previous count so concurrent appends cannot share a number.
        let updated = sqlx::query(
            r#"
            UPDATE stories
            SET episode_count = $2, total_duration_seconds = $3, is_complete = $4, completed_at = $5
            WHERE id = $1 AND episode_count = $2 - 1 AND NOT is_complete
            "#,
        )
        .bind(story.id.into_inner())
        .bind(to_i32(story.episode_count, "episode_count")?)
        .bind(to_i32(story.total_duration_seconds, "total_duration_seconds")?)
        .bind(story.is_complete)
        .bind(story.completed_at)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            warn!("Episode append lost a race on story {}", story.id);
            return Err(StoryError::conflict("Story changed while adding the episode, please retry"));
        }

        let row = sqlx::query_as::<_, EpisodeRow>(&format!(
            r#"
            INSERT INTO episodes ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(episode.id.into_inner())
        .bind(episode.story_id.into_inner())
        .bind(to_i32(episode.episode_number, "episode_number")?)
        .bind(&episode.video_url)
        .bind(episode.duration_seconds.map(|d| to_i32(d, "duration_seconds")).transpose()?)
        .bind(&episode.winning_phrase)
        .bind(&episode.story_prompt)
        .bind(episode.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Episode::try_from(row)
    }
}
