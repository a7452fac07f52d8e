//! Episode entity.

use crate::{Entity, EpisodeId, StoryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated video segment built from one winning phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: EpisodeId,

    pub story_id: StoryId,

    /// 1-based position within the story.
    pub episode_number: u32,

    pub video_url: Option<String>,

    pub duration_seconds: Option<u32>,

    pub winning_phrase: String,

    /// Prompt handed to the video generator.
    pub story_prompt: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Episode {
    /// Creates an episode.
    #[must_use]
    pub fn new(
        story_id: StoryId,
        episode_number: u32,
        video_url: Option<String>,
        duration_seconds: Option<u32>,
        winning_phrase: String,
        story_prompt: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EpisodeId::new(),
            story_id,
            episode_number,
            video_url,
            duration_seconds,
            winning_phrase,
            story_prompt,
            created_at: now,
        }
    }
}

impl Entity<EpisodeId> for Episode {
    fn id(&self) -> &EpisodeId {
        &self.id
    }
}
