//! Story entity.

use crate::domain::progress::{progress_percentage, reaches_completion, StoryStage};
use crate::{Entity, StoryError, StoryId, StoryResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An ordered accumulation of episodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Unique identifier.
    pub id: StoryId,

    /// Sequence number, starting at 1.
    pub story_number: u32,

    /// Display title.
    pub title: Option<String>,

    /// Sum of episode durations in seconds.
    pub total_duration_seconds: u32,

    /// Number of episodes appended so far.
    pub episode_count: u32,

    /// Whether the story has stopped accepting episodes.
    pub is_complete: bool,

    /// When the story was completed.
    pub completed_at: Option<DateTime<Utc>>,

    /// Stitched video of all episodes.
    pub full_video_url: Option<String>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Story {
    /// Creates an empty story; the title defaults to `Story #n`.
    #[must_use]
    pub fn new(story_number: u32, title: Option<String>, now: DateTime<Utc>) -> Self {
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("Story #{story_number}"));
        Self {
            id: StoryId::new(),
            story_number,
            title: Some(title),
            total_duration_seconds: 0,
            episode_count: 0,
            is_complete: false,
            completed_at: None,
            full_video_url: None,
            created_at: now,
        }
    }

    /// Number the next appended episode receives.
    #[must_use]
    pub const fn next_episode_number(&self) -> u32 {
        self.episode_count + 1
    }

    /// Accounts for a new episode and returns its number.
    ///
    /// Reaching the completion threshold completes the story.
    ///
    /// # Errors
    ///
    /// Fails when the story is already complete.
    pub fn record_episode(&mut self, duration_seconds: Option<u32>, now: DateTime<Utc>) -> StoryResult<u32> {
        if self.is_complete {
            return Err(StoryError::business_rule("Cannot add episodes to completed story"));
        }
        let number = self.next_episode_number();
        self.episode_count = number;
        self.total_duration_seconds = self.total_duration_seconds.saturating_add(duration_seconds.unwrap_or(0));
        if reaches_completion(self.total_duration_seconds) {
            self.is_complete = true;
            self.completed_at = Some(now);
        }
        Ok(number)
    }

    /// Marks the story complete, optionally attaching the stitched video.
    ///
    /// A story completed automatically can still receive its video once.
    ///
    /// # Errors
    ///
    /// Fails when the story is already complete and nothing new is attached.
    pub fn complete(&mut self, full_video_url: Option<String>, now: DateTime<Utc>) -> StoryResult<()> {
        let attaches_video = full_video_url.is_some() && self.full_video_url.is_none();
        if self.is_complete && !attaches_video {
            return Err(StoryError::business_rule("Story is already complete"));
        }
        if !self.is_complete {
            self.is_complete = true;
            self.completed_at = Some(now);
        }
        if full_video_url.is_some() {
            self.full_video_url = full_video_url;
        }
        Ok(())
    }

    /// Progress towards the completion band.
    #[must_use]
    pub fn progress_percentage(&self) -> f64 {
        progress_percentage(self.total_duration_seconds)
    }

    /// Narrative stage.
    #[must_use]
    pub const fn stage(&self) -> StoryStage {
        StoryStage::from_duration(self.total_duration_seconds)
    }
}

impl Entity<StoryId> for Story {
    fn id(&self) -> &StoryId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_defaults_to_number() {
        let now = Utc::now();
        assert_eq!(Story::new(7, None, now).title.as_deref(), Some("Story #7"));
        assert_eq!(Story::new(7, Some("  ".into()), now).title.as_deref(), Some("Story #7"));
        assert_eq!(Story::new(7, Some("Owls".into()), now).title.as_deref(), Some("Owls"));
    }

    #[test]
    fn test_record_episode_numbers_contiguously() {
        let now = Utc::now();
        let mut story = Story::new(1, None, now);
        assert_eq!(story.record_episode(Some(20), now).unwrap(), 1);
        assert_eq!(story.record_episode(None, now).unwrap(), 2);
        assert_eq!(story.record_episode(Some(30), now).unwrap(), 3);
        assert_eq!(story.episode_count, 3);
        assert_eq!(story.total_duration_seconds, 50);
        assert!(!story.is_complete);
    }

    #[test]
    fn test_reaching_threshold_completes_story() {
        let now = Utc::now();
        let mut story = Story::new(1, None, now);
        story.record_episode(Some(400), now).unwrap();
        story.record_episode(Some(30), now).unwrap();
        assert!(story.is_complete);
        assert_eq!(story.completed_at, Some(now));

        let err = story.record_episode(Some(10), now).unwrap_err();
        assert_eq!(err.to_string(), "Cannot add episodes to completed story");
        assert_eq!(story.episode_count, 2);
    }

    #[test]
    fn test_complete_once_and_attach_video() {
        let now = Utc::now();
        let mut story = Story::new(1, None, now);
        story.complete(None, now).unwrap();
        assert!(story.is_complete);
        assert!(story.complete(None, now).is_err());

        story.complete(Some("https://cdn.example/full.mp4".into()), now).unwrap();
        assert_eq!(story.full_video_url.as_deref(), Some("https://cdn.example/full.mp4"));
        assert!(story.complete(Some("https://cdn.example/other.mp4".into()), now).is_err());
    }
}
