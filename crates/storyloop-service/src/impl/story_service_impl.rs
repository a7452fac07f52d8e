//! Story service implementation.

use crate::dto::{
    CompleteStoryRequest, CreateStoryRequest, CreateStoryResponse, CurrentStoryResponse, StoryListResponse,
    StoryResponse, StoryStatusResponse,
};
use crate::metrics;
use crate::story_service::StoryService;
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use storyloop_core::{Clock, Story, StoryError, StoryId, StoryResult, StoryStatus, ValidateExt};
use storyloop_repository::{EpisodeRepository, StoryRepository};
use tracing::{info, warn};

/// Attempts at claiming the next story number.
const CREATE_ATTEMPTS: u32 = 3;

#[derive(Component)]
#[shaku(interface = StoryService)]
pub struct StoryServiceImpl {
    #[shaku(inject)]
    stories: Arc<dyn StoryRepository>,
    #[shaku(inject)]
    episodes: Arc<dyn EpisodeRepository>,
    clock: Arc<dyn Clock>,
}

impl StoryServiceImpl {
    pub fn new(stories: Arc<dyn StoryRepository>, episodes: Arc<dyn EpisodeRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            stories,
            episodes,
            clock,
        }
    }
}

#[async_trait]
impl StoryService for StoryServiceImpl {
    async fn current(&self) -> StoryResult<CurrentStoryResponse> {
        let story = self.stories.find_current().await?;
        Ok(CurrentStoryResponse {
            story: story.map(StoryResponse::from),
        })
    }

    async fn list(&self, include_completed: bool) -> StoryResult<StoryListResponse> {
        let stories = self.stories.find_all(include_completed).await?;
        Ok(StoryListResponse {
            stories: stories.into_iter().map(StoryResponse::from).collect(),
        })
    }

    async fn create(&self, request: CreateStoryRequest) -> StoryResult<CreateStoryResponse> {
        request.validate_request()?;

        let mut attempt = 1;
        let saved = loop {
            let number = self.stories.max_story_number().await?.unwrap_or(0).saturating_add(1);
            let story = Story::new(number, request.title.clone(), self.clock.now());
            match self.stories.save(&story).await {
                Ok(saved) => break saved,
                Err(StoryError::Conflict(reason)) if attempt < CREATE_ATTEMPTS => {
                    warn!("Story number {} taken ({}), retrying", number, reason);
                    attempt += 1;
                }
                Err(StoryError::Conflict(_)) => {
                    return Err(StoryError::conflict("Could not allocate a story number, please retry"));
                }
                Err(e) => return Err(e),
            }
        };

        info!("Story #{} created", saved.story_number);
        Ok(CreateStoryResponse {
            message: "Story created successfully".to_string(),
            story: StoryResponse::from(saved),
        })
    }

    async fn status(&self) -> StoryResult<StoryStatusResponse> {
        let Some(story) = self.stories.find_current().await? else {
            return Ok(StoryStatusResponse::from(StoryStatus::empty()));
        };
        let episodes = self.episodes.find_by_story(story.id, None).await?;
        Ok(StoryStatusResponse::from(StoryStatus::of(story, episodes)))
    }

    async fn complete(&self, id: &str, request: CompleteStoryRequest) -> StoryResult<StoryResponse> {
        request.validate_request()?;

        let id = StoryId::parse(id.trim()).map_err(|_| StoryError::not_found("Story", id))?;
        let mut story = self
            .stories
            .find_by_id(id)
            .await?
            .ok_or_else(|| StoryError::not_found("Story", id))?;

        let was_complete = story.is_complete;
        story.complete(request.full_video_url, self.clock.now())?;
        let updated = self.stories.update(&story).await?;

        if !was_complete {
            metrics::record_story_completed("manual");
        }
        info!("Story #{} completed", updated.story_number);
        Ok(StoryResponse::from(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use storyloop_core::{Episode, FixedClock, StoryStage};
    use storyloop_repository::MemoryStore;

    fn service() -> (StoryServiceImpl, MemoryStore) {
        let store = MemoryStore::new();
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap()));
        let service = StoryServiceImpl::new(Arc::new(store.stories()), Arc::new(store.episodes()), clock);
        (service, store)
    }

    async fn add_episode(store: &MemoryStore, story: &mut Story, seconds: u32) {
        let now = Utc::now();
        let number = story.record_episode(Some(seconds), now).unwrap();
        let episode = Episode::new(story.id, number, None, Some(seconds), format!("scene {number}"), None, now);
        store.episodes().append(story, &episode).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_numbers_stories_sequentially() {
        let (service, _) = service();

        let first = service.create(CreateStoryRequest::default()).await.unwrap();
        assert_eq!(first.message, "Story created successfully");
        assert_eq!(first.story.story_number, 1);
        assert_eq!(first.story.title.as_deref(), Some("Story #1"));

        let second = service
            .create(CreateStoryRequest {
                title: Some("Night Market".into()),
            })
            .await
            .unwrap();
        assert_eq!(second.story.story_number, 2);
        assert_eq!(second.story.title.as_deref(), Some("Night Market"));

        let listed = service.list(false).await.unwrap();
        let numbers: Vec<u32> = listed.stories.iter().map(|s| s.story_number).collect();
        assert_eq!(numbers, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_status_without_story() {
        let (service, _) = service();
        let status = service.status().await.unwrap();
        assert!(status.current_story.is_none());
        assert_eq!(status.next_episode_number, 1);
        assert_eq!(status.stage, StoryStage::Starting);
        assert_eq!(status.formatted_duration, "0:00");
    }

    #[tokio::test]
    async fn test_status_reflects_episodes() {
        let (service, store) = service();
        let created = service.create(CreateStoryRequest::default()).await.unwrap();
        let mut story = store.stories().find_by_id(created.story.id).await.unwrap().unwrap();
        add_episode(&store, &mut story, 90).await;
        add_episode(&store, &mut story, 45).await;

        let status = service.status().await.unwrap();
        assert_eq!(status.episodes.len(), 2);
        assert_eq!(status.total_duration, 135);
        assert_eq!(status.next_episode_number, 3);
        assert_eq!(status.formatted_duration, "2:15");
        assert!(!status.should_complete);
    }

    #[tokio::test]
    async fn test_complete_then_attach_video_once() {
        let (service, _) = service();
        let created = service.create(CreateStoryRequest::default()).await.unwrap();
        let id = created.story.id.to_string();

        let completed = service.complete(&id, CompleteStoryRequest::default()).await.unwrap();
        assert!(completed.is_complete);
        assert!(completed.completed_at.is_some());

        let err = service.complete(&id, CompleteStoryRequest::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Story is already complete");

        let with_video = CompleteStoryRequest {
            full_video_url: Some("https://cdn.example.com/full.mp4".into()),
        };
        let attached = service.complete(&id, with_video).await.unwrap();
        assert_eq!(attached.full_video_url.as_deref(), Some("https://cdn.example.com/full.mp4"));
        assert!(service.current().await.unwrap().story.is_none());
    }

    #[tokio::test]
    async fn test_complete_unknown_story() {
        let (service, _) = service();
        let unknown = StoryId::new().to_string();
        for id in ["not-a-uuid", unknown.as_str()] {
            let err = service.complete(id, CompleteStoryRequest::default()).await.unwrap_err();
            assert_eq!(err.status_code(), 404);
            assert_eq!(err.to_string(), "Story not found");
        }
    }
}
