//! PostgreSQL story repository.

use super::{to_i32, to_u32};
use crate::{traits::StoryRepository, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shaku::Component;
use sqlx::FromRow;
use std::sync::Arc;
use storyloop_core::{Story, StoryError, StoryId, StoryResult};
use tracing::debug;
use uuid::Uuid;

const COLUMNS: &str = "id, story_number, title, total_duration_seconds, episode_count, \
                       is_complete, completed_at, full_video_url, created_at";

/// PostgreSQL story repository.
#[derive(Clone, Component)]
#[shaku(interface = StoryRepository)]
pub struct PgStoryRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgStoryRepository {
    /// Creates a repository on `pool`.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct StoryRow {
    id: Uuid,
    story_number: i32,
    title: Option<String>,
    total_duration_seconds: i32,
    episode_count: i32,
    is_complete: bool,
    completed_at: Option<DateTime<Utc>>,
    full_video_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<StoryRow> for Story {
    type Error = StoryError;

    fn try_from(row: StoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: StoryId::from_uuid(row.id),
            story_number: to_u32(row.story_number, "story_number")?,
            title: row.title,
            total_duration_seconds: to_u32(row.total_duration_seconds, "total_duration_seconds")?,
            episode_count: to_u32(row.episode_count, "episode_count")?,
            is_complete: row.is_complete,
            completed_at: row.completed_at,
            full_video_url: row.full_video_url,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl StoryRepository for PgStoryRepository {
    async fn find_by_id(&self, id: StoryId) -> StoryResult<Option<Story>> {
        debug!("Finding story by id: {}", id);

        let row = sqlx::query_as::<_, StoryRow>(&format!("SELECT {COLUMNS} FROM stories WHERE id = $1"))
            .bind(id.into_inner())
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(Story::try_from).transpose()
    }

    async fn find_current(&self) -> StoryResult<Option<Story>> {
        let row = sqlx::query_as::<_, StoryRow>(&format!(
            "SELECT {COLUMNS} FROM stories WHERE NOT is_complete ORDER BY created_at DESC, story_number DESC LIMIT 1"
        ))
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(Story::try_from).transpose()
    }

    async fn find_all(&self, include_completed: bool) -> StoryResult<Vec<Story>> {
        debug!("Listing stories (include_completed={})", include_completed);

        let rows = sqlx::query_as::<_, StoryRow>(&format!(
            "SELECT {COLUMNS} FROM stories WHERE $1 OR NOT is_complete ORDER BY story_number DESC"
        ))
        .bind(include_completed)
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(Story::try_from).collect()
    }

    async fn max_story_number(&self) -> StoryResult<Option<u32>> {
        let max: Option<i32> = sqlx::query_scalar("SELECT MAX(story_number) FROM stories")
            .fetch_one(self.pool.inner())
            .await?;

        max.map(|n| to_u32(n, "story_number")).transpose()
    }

    async fn save(&self, story: &Story) -> StoryResult<Story> {
        debug!("Saving story #{}", story.story_number);

        let row = sqlx::query_as::<_, StoryRow>(&format!(
            r#"
            INSERT INTO stories ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(story.id.into_inner())
        .bind(to_i32(story.story_number, "story_number")?)
        .bind(&story.title)
        .bind(to_i32(story.total_duration_seconds, "total_duration_seconds")?)
        .bind(to_i32(story.episode_count, "episode_count")?)
        .bind(story.is_complete)
        .bind(story.completed_at)
        .bind(&story.full_video_url)
        .bind(story.created_at)
        .fetch_one(self.pool.inner())
        .await?;

        Story::try_from(row)
    }

    async fn update(&self, story: &Story) -> StoryResult<Story> {
        debug!("Updating story: {}", story.id);

        let row = sqlx::query_as::<_, StoryRow>(&format!(
            r#"
            UPDATE stories
            SET title = $2, is_complete = $3, completed_at = $4, full_video_url = $5
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(story.id.into_inner())
        .bind(&story.title)
        .bind(story.is_complete)
        .bind(story.completed_at)
        .bind(&story.full_video_url)
        .fetch_optional(self.pool.inner())
        .await?
        .ok_or_else(|| StoryError::not_found("Story", story.id))?;

        Story::try_from(row)
    }
}
