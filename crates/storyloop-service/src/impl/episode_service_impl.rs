//! Episode service implementation.

use crate::dto::{
    present, CreateEpisodeRequest, CreateEpisodeResponse, EpisodeListQuery, EpisodeListResponse, EpisodeResponse,
    StoryResponse,
};
use crate::episode_service::EpisodeService;
use crate::metrics;
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use storyloop_core::{sanitize_phrase, Clock, Episode, StoryError, StoryId, StoryResult, ValidateExt};
use storyloop_repository::{EpisodeRepository, StoryRepository};
use tracing::{debug, info};

#[derive(Component)]
#[shaku(interface = EpisodeService)]
pub struct EpisodeServiceImpl {
    #[shaku(inject)]
    stories: Arc<dyn StoryRepository>,
    #[shaku(inject)]
    episodes: Arc<dyn EpisodeRepository>,
    clock: Arc<dyn Clock>,
}

impl EpisodeServiceImpl {
    pub fn new(stories: Arc<dyn StoryRepository>, episodes: Arc<dyn EpisodeRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            stories,
            episodes,
            clock,
        }
    }
}

#[async_trait]
impl EpisodeService for EpisodeServiceImpl {
    async fn list(&self, query: EpisodeListQuery) -> StoryResult<EpisodeListResponse> {
        let Some(story_id) = present(query.story_id.as_deref()) else {
            return Err(StoryError::validation("storyId is required"));
        };
        let story_id = StoryId::parse(story_id).map_err(|_| StoryError::validation("Invalid story ID"))?;

        let episodes = self.episodes.find_by_story(story_id, query.limit).await?;
        debug!("Found {} episodes for story {}", episodes.len(), story_id);
        Ok(EpisodeListResponse {
            episodes: episodes.into_iter().map(EpisodeResponse::from).collect(),
        })
    }

    async fn create(&self, request: CreateEpisodeRequest) -> StoryResult<CreateEpisodeResponse> {
        let (Some(story_id), Some(phrase)) = (
            present(request.story_id.as_deref()),
            present(request.winning_phrase.as_deref()),
        ) else {
            return Err(StoryError::validation("storyId and winningPhrase are required"));
        };
        request.validate_request()?;

        let story_id = StoryId::parse(story_id).map_err(|_| StoryError::not_found("Story", story_id))?;
        let mut story = self
            .stories
            .find_by_id(story_id)
            .await?
            .ok_or_else(|| StoryError::not_found("Story", story_id))?;

        let now = self.clock.now();
        let number = story.record_episode(request.duration_seconds, now)?;
        let prompt = present(request.story_prompt.as_deref())
            .map_or_else(|| format!("Generated scene based on: {}", sanitize_phrase(phrase)), str::to_string);
        let episode = Episode::new(
            story.id,
            number,
            present(request.video_url.as_deref()).map(str::to_string),
            request.duration_seconds,
            phrase.to_string(),
            Some(prompt),
            now,
        );

        let saved = self.episodes.append(&story, &episode).await?;
        metrics::record_episode(story.is_complete);
        if story.is_complete {
            info!(
                "Story #{} reached {}s and completed with episode {}",
                story.story_number, story.total_duration_seconds, saved.episode_number
            );
        } else {
            info!("Episode {} added to story #{}", saved.episode_number, story.story_number);
        }

        Ok(CreateEpisodeResponse {
            message: "Episode created successfully".to_string(),
            episode: EpisodeResponse::from(saved),
            story: StoryResponse::from(story),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use storyloop_core::{FixedClock, Story};
    use storyloop_repository::MemoryStore;

    async fn setup() -> (EpisodeServiceImpl, MemoryStore, Story) {
        let store = MemoryStore::new();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 18, 5, 0).unwrap();
        let story = Story::new(1, None, now);
        store.stories().save(&story).await.unwrap();
        let service = EpisodeServiceImpl::new(
            Arc::new(store.stories()),
            Arc::new(store.episodes()),
            Arc::new(FixedClock::new(now)),
        );
        (service, store, story)
    }

    fn request(story: &Story, seconds: u32) -> CreateEpisodeRequest {
        CreateEpisodeRequest {
            story_id: Some(story.id.to_string()),
            video_url: Some("https://cdn.example.com/ep.mp4".into()),
            duration_seconds: Some(seconds),
            winning_phrase: Some("  a lantern   drifts <home> ".into()),
            story_prompt: None,
        }
    }

    #[tokio::test]
    async fn test_create_appends_with_default_prompt() {
        let (service, _, story) = setup().await;

        let created = service.create(request(&story, 30)).await.unwrap();
        assert_eq!(created.message, "Episode created successfully");
        assert_eq!(created.episode.episode_number, 1);
        let prompt = created.episode.story_prompt.unwrap();
        assert!(prompt.starts_with("Generated scene based on: "));
        assert!(!prompt.contains('<'));
        assert_eq!(created.story.episode_count, 1);
        assert_eq!(created.story.total_duration_seconds, 30);

        let second = service.create(request(&story, 30)).await.unwrap();
        assert_eq!(second.episode.episode_number, 2);
    }

    #[tokio::test]
    async fn test_reaching_seven_minutes_completes_story() {
        let (service, store, story) = setup().await;

        service.create(request(&story, 400)).await.unwrap();
        let last = service.create(request(&story, 30)).await.unwrap();
        assert!(last.story.is_complete);
        assert_eq!(last.story.total_duration_seconds, 430);

        let stored = store.stories().find_by_id(story.id).await.unwrap().unwrap();
        assert!(stored.is_complete);

        let err = service.create(request(&story, 10)).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot add episodes to completed story");
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_create_requires_story_and_phrase() {
        let (service, _, story) = setup().await;
        let mut missing = request(&story, 10);
        missing.winning_phrase = Some("   ".into());
        let err = service.create(missing).await.unwrap_err();
        assert_eq!(err.to_string(), "storyId and winningPhrase are required");

        let mut unknown = request(&story, 10);
        unknown.story_id = Some(StoryId::new().to_string());
        assert_eq!(service.create(unknown).await.unwrap_err().status_code(), 404);
    }

    #[tokio::test]
    async fn test_list_in_order_with_limit() {
        let (service, _, story) = setup().await;
        for _ in 0..3 {
            service.create(request(&story, 20)).await.unwrap();
        }

        let query = |limit| EpisodeListQuery {
            story_id: Some(story.id.to_string()),
            limit,
        };
        let all = service.list(query(None)).await.unwrap();
        let numbers: Vec<u32> = all.episodes.iter().map(|e| e.episode_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(service.list(query(Some(2))).await.unwrap().episodes.len(), 2);
    }

    #[tokio::test]
    async fn test_list_rejects_bad_story_id() {
        let (service, _, _) = setup().await;
        let err = service.list(EpisodeListQuery::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "storyId is required");

        let bad = EpisodeListQuery {
            story_id: Some("nope".into()),
            limit: None,
        };
        assert_eq!(service.list(bad).await.unwrap_err().to_string(), "Invalid story ID");
    }
}
