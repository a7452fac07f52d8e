//! Demo content for fresh deployments.

use crate::traits::{EpisodeRepository, StoryRepository};
use chrono::{DateTime, Utc};
use storyloop_core::{Episode, Story, StoryResult};
use tracing::info;

const DEMO_TITLE: &str = "The Enchanted Garden";
const DEMO_VIDEO_BASE: &str = "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample";
const DEMO_EPISODE_SECONDS: u32 = 20;
const DEMO_EPISODES: [(&str, &str); 3] = [
    ("magical butterfly garden", "BigBuckBunny.mp4"),
    ("dancing fairy", "ElephantsDream.mp4"),
    ("mysterious door", "ForBiggerBlazes.mp4"),
];

/// Creates the demo story with three episodes unless any story exists.
///
/// Returns whether anything was written.
pub async fn seed_demo_story(
    stories: &dyn StoryRepository,
    episodes: &dyn EpisodeRepository,
    now: DateTime<Utc>,
) -> StoryResult<bool> {
    if stories.max_story_number().await?.is_some() {
        return Ok(false);
    }

    let mut story = stories.save(&Story::new(1, Some(DEMO_TITLE.to_string()), now)).await?;
    for (phrase, file) in DEMO_EPISODES {
        let number = story.record_episode(Some(DEMO_EPISODE_SECONDS), now)?;
        let episode = Episode::new(
            story.id,
            number,
            Some(format!("{DEMO_VIDEO_BASE}/{file}")),
            Some(DEMO_EPISODE_SECONDS),
            phrase.to_string(),
            Some(format!("Generated scene based on: {phrase}")),
            now,
        );
        episodes.append(&story, &episode).await?;
    }

    info!("Seeded demo story \"{}\" with {} episodes", DEMO_TITLE, story.episode_count);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[tokio::test]
    async fn test_seed_is_consistent_and_runs_once() {
        let store = MemoryStore::new();
        let (stories, episodes) = (store.stories(), store.episodes());
        let now = Utc::now();
        assert!(seed_demo_story(&stories, &episodes, now).await.unwrap());
        assert!(!seed_demo_story(&stories, &episodes, now).await.unwrap());

        let story = stories.find_current().await.unwrap().unwrap();
        assert_eq!(story.title.as_deref(), Some(DEMO_TITLE));
        assert_eq!(story.episode_count, 3);
        assert_eq!(story.total_duration_seconds, 60);

        let episodes = episodes.find_by_story(story.id, None).await.unwrap();
        let numbers: Vec<u32> = episodes.iter().map(|e| e.episode_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(episodes[1].winning_phrase, "dancing fairy");
    }
}
