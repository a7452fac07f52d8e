//! Story progress accounting.

use super::entities::{Episode, Story};
use serde::{Deserialize, Serialize};

/// A story becomes complete once it holds at least this much footage.
pub const COMPLETION_MIN_SECONDS: u32 = 420;
/// Upper edge of the completion band; also the 100% mark.
pub const COMPLETION_MAX_SECONDS: u32 = 540;

/// Sum of episode durations, treating unknown durations as zero.
#[must_use]
pub fn total_duration(episodes: &[Episode]) -> u32 {
    episodes
        .iter()
        .map(|episode| episode.duration_seconds.unwrap_or(0))
        .sum()
}

/// Whether `total` sits inside the completion band.
#[must_use]
pub const fn should_complete(total: u32) -> bool {
    total >= COMPLETION_MIN_SECONDS && total < COMPLETION_MAX_SECONDS
}

/// Whether `total` has reached the completion threshold.
#[must_use]
pub const fn reaches_completion(total: u32) -> bool {
    total >= COMPLETION_MIN_SECONDS
}

/// Progress towards the upper edge of the band, capped at 100.
#[must_use]
pub fn progress_percentage(total: u32) -> f64 {
    (f64::from(total) / f64::from(COMPLETION_MAX_SECONDS) * 100.0).min(100.0)
}

/// Formats seconds as `m:ss`.
#[must_use]
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Narrative stage derived from accumulated footage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum StoryStage {
    Starting,
    Growing,
    Climax,
    Complete,
}

impl StoryStage {
    /// Stage for a total duration in seconds.
    #[must_use]
    pub const fn from_duration(total: u32) -> Self {
        if total < 120 {
            Self::Starting
        } else if total < 300 {
            Self::Growing
        } else if total < COMPLETION_MIN_SECONDS {
            Self::Climax
        } else {
            Self::Complete
        }
    }

    /// Banner text.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Starting => "Story just beginning...",
            Self::Growing => "Story developing...",
            Self::Climax => "Approaching climax...",
            Self::Complete => "Story complete!",
        }
    }
}

/// Snapshot of the story currently being told.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryStatus {
    pub current_story: Option<Story>,
    pub episodes: Vec<Episode>,
    pub should_complete: bool,
    pub next_episode_number: u32,
    pub total_duration: u32,
    pub progress_percentage: f64,
}

impl StoryStatus {
    /// Status when no story is in progress.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            current_story: None,
            episodes: Vec::new(),
            should_complete: false,
            next_episode_number: 1,
            total_duration: 0,
            progress_percentage: 0.0,
        }
    }

    /// Status of `story` given its episodes.
    #[must_use]
    pub fn of(story: Story, episodes: Vec<Episode>) -> Self {
        let total = total_duration(&episodes);
        let next_episode_number = u32::try_from(episodes.len()).map_or(u32::MAX, |n| n.saturating_add(1));
        Self {
            current_story: Some(story),
            should_complete: should_complete(total),
            next_episode_number,
            total_duration: total,
            progress_percentage: progress_percentage(total),
            episodes,
        }
    }

    /// Narrative stage of the status.
    #[must_use]
    pub const fn stage(&self) -> StoryStage {
        StoryStage::from_duration(self.total_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoryId;
    use chrono::Utc;

    fn episode(story: StoryId, number: u32, duration: Option<u32>) -> Episode {
        Episode::new(story, number, None, duration, format!("phrase {number}"), None, Utc::now())
    }

    #[test]
    fn test_total_duration_ignores_missing_durations() {
        let story = StoryId::new();
        let episodes = vec![episode(story, 1, Some(20)), episode(story, 2, None), episode(story, 3, Some(25))];
        assert_eq!(total_duration(&episodes), 45);
    }

    #[test]
    fn test_completion_band() {
        assert!(!should_complete(419));
        assert!(should_complete(420));
        assert!(should_complete(539));
        assert!(!should_complete(540));
        assert!(reaches_completion(540));
    }

    #[test]
    fn test_progress_percentage_is_capped() {
        assert!((progress_percentage(270) - 50.0).abs() < f64::EPSILON);
        assert!((progress_percentage(900) - 100.0).abs() < f64::EPSILON);
        assert!(progress_percentage(0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(65), "1:05");
        assert_eq!(format_duration(600), "10:00");
    }

    #[test]
    fn test_stages() {
        assert_eq!(StoryStage::from_duration(119), StoryStage::Starting);
        assert_eq!(StoryStage::from_duration(120), StoryStage::Growing);
        assert_eq!(StoryStage::from_duration(300), StoryStage::Climax);
        assert_eq!(StoryStage::from_duration(420).message(), "Story complete!");
    }

    #[test]
    fn test_status_of_story() {
        let story = Story::new(1, None, Utc::now());
        let episodes = vec![episode(story.id, 1, Some(200)), episode(story.id, 2, Some(230))];
        let status = StoryStatus::of(story, episodes);
        assert_eq!(status.next_episode_number, 3);
        assert_eq!(status.total_duration, 430);
        assert!(status.should_complete);
        assert_eq!(status.stage(), StoryStage::Complete);
    }

    #[test]
    fn test_empty_status() {
        let status = StoryStatus::empty();
        assert!(status.current_story.is_none());
        assert_eq!(status.next_episode_number, 1);
        assert!(!status.should_complete);
    }
}
