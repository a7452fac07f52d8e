//! In-process storage backend.
//!
//! Keeps every table behind a single lock so multi-record writes (a vote and
//! its counter, an episode and its story) are applied atomically, the same
//! guarantees the PostgreSQL backend gets from transactions.

use crate::traits::{
    AnonymousUserRepository, EpisodeRepository, StoryRepository, SubmissionRepository, VoteRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use shaku::Component;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use storyloop_core::{
    AnonymousUser, AnonymousUserId, Episode, HealthCheck, HealthStatus, SessionKey, Story, StoryError, StoryId,
    StoryResult, Submission, SubmissionId, Vote,
};
use tracing::debug;

#[derive(Default)]
struct MemoryState {
    users: HashMap<AnonymousUserId, AnonymousUser>,
    submissions: HashMap<SubmissionId, Submission>,
    votes: Vec<Vote>,
    stories: HashMap<StoryId, Story>,
    episodes: Vec<Episode>,
}

impl MemoryState {
    fn ranked(&self, session: SessionKey) -> Vec<Submission> {
        let mut ranked: Vec<Submission> =
            self.submissions.values().filter(|s| s.session() == session).cloned().collect();
        ranked.sort_by_key(|s| (Reverse(s.votes), s.created_at, s.id));
        ranked
    }
}

/// Lock-guarded in-memory tables behind every memory repository.
///
/// Clones share the same state, so repositories handed out by one store see
/// each other's writes.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Anonymous user repository on this store.
    #[must_use]
    pub fn users(&self) -> MemoryAnonymousUserRepository {
        MemoryAnonymousUserRepository { store: self.clone() }
    }

    /// Submission repository on this store.
    #[must_use]
    pub fn submissions(&self) -> MemorySubmissionRepository {
        MemorySubmissionRepository { store: self.clone() }
    }

    /// Vote repository on this store.
    #[must_use]
    pub fn votes(&self) -> MemoryVoteRepository {
        MemoryVoteRepository { store: self.clone() }
    }

    /// Story repository on this store.
    #[must_use]
    pub fn stories(&self) -> MemoryStoryRepository {
        MemoryStoryRepository { store: self.clone() }
    }

    /// Episode repository on this store.
    #[must_use]
    pub fn episodes(&self) -> MemoryEpisodeRepository {
        MemoryEpisodeRepository { store: self.clone() }
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("MemoryStore")
            .field("users", &state.users.len())
            .field("submissions", &state.submissions.len())
            .field("votes", &state.votes.len())
            .field("stories", &state.stories.len())
            .field("episodes", &state.episodes.len())
            .finish()
    }
}

/// Anonymous users kept in a [`MemoryStore`].
#[derive(Clone, Component)]
#[shaku(interface = AnonymousUserRepository)]
pub struct MemoryAnonymousUserRepository {
    store: MemoryStore,
}

/// Submissions kept in a [`MemoryStore`].
#[derive(Clone, Component)]
#[shaku(interface = SubmissionRepository)]
pub struct MemorySubmissionRepository {
    store: MemoryStore,
}

/// Votes kept in a [`MemoryStore`].
#[derive(Clone, Component)]
#[shaku(interface = VoteRepository)]
pub struct MemoryVoteRepository {
    store: MemoryStore,
}

/// Stories kept in a [`MemoryStore`].
#[derive(Clone, Component)]
#[shaku(interface = StoryRepository)]
pub struct MemoryStoryRepository {
    store: MemoryStore,
}

/// Episodes kept in a [`MemoryStore`].
#[derive(Clone, Component)]
#[shaku(interface = EpisodeRepository)]
pub struct MemoryEpisodeRepository {
    store: MemoryStore,
}

#[async_trait]
impl AnonymousUserRepository for MemoryAnonymousUserRepository {
    async fn upsert_by_fingerprint(&self, fingerprint: &str, now: DateTime<Utc>) -> StoryResult<AnonymousUser> {
        let mut state = self.store.state.write();
        if let Some(user) = state.users.values_mut().find(|u| u.fingerprint == fingerprint) {
            user.touch(now);
            return Ok(user.clone());
        }
        let user = AnonymousUser::new(fingerprint, now);
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: AnonymousUserId) -> StoryResult<Option<AnonymousUser>> {
        Ok(self.store.state.read().users.get(&id).cloned())
    }
}

#[async_trait]
impl SubmissionRepository for MemorySubmissionRepository {
    async fn find_by_id(&self, id: SubmissionId) -> StoryResult<Option<Submission>> {
        Ok(self.store.state.read().submissions.get(&id).cloned())
    }

    async fn find_by_session(&self, session: SessionKey) -> StoryResult<Vec<Submission>> {
        Ok(self.store.state.read().ranked(session))
    }

    async fn find_top_by_session(&self, session: SessionKey) -> StoryResult<Option<Submission>> {
        Ok(self.store.state.read().ranked(session).into_iter().next())
    }

    async fn find_by_author(&self, session: SessionKey, author: AnonymousUserId) -> StoryResult<Option<Submission>> {
        let state = self.store.state.read();
        Ok(state
            .submissions
            .values()
            .find(|s| s.session() == session && s.is_authored_by(author))
            .cloned())
    }

    async fn save(&self, submission: &Submission) -> StoryResult<Submission> {
        let mut state = self.store.state.write();
        let session = submission.session();
        if state
            .submissions
            .values()
            .any(|s| s.session() == session && s.is_authored_by(submission.anonymous_user_id))
        {
            return Err(StoryError::conflict("duplicate key value violates submissions_one_per_session"));
        }
        debug!("Storing submission {} for session {}", submission.id, session);
        state.submissions.insert(submission.id, submission.clone());
        Ok(submission.clone())
    }
}

#[async_trait]
impl VoteRepository for MemoryVoteRepository {
    async fn find_by_voter(&self, session: SessionKey, voter: AnonymousUserId) -> StoryResult<Option<Vote>> {
        let state = self.store.state.read();
        Ok(state
            .votes
            .iter()
            .find(|v| v.session() == session && v.anonymous_user_id == voter)
            .cloned())
    }

    async fn cast(&self, vote: &Vote) -> StoryResult<Vote> {
        let mut state = self.store.state.write();
        let session = vote.session();
        if state.votes.iter().any(|v| v.session() == session && v.anonymous_user_id == vote.anonymous_user_id) {
            return Err(StoryError::conflict("duplicate key value violates votes_one_per_session"));
        }
        let submission = state
            .submissions
            .get_mut(&vote.submission_id)
            .ok_or_else(|| StoryError::not_found("Submission", vote.submission_id))?;
        submission.votes = submission.votes.saturating_add(1);
        state.votes.push(vote.clone());
        Ok(vote.clone())
    }
}

#[async_trait]
impl StoryRepository for MemoryStoryRepository {
    async fn find_by_id(&self, id: StoryId) -> StoryResult<Option<Story>> {
        Ok(self.store.state.read().stories.get(&id).cloned())
    }

    async fn find_current(&self) -> StoryResult<Option<Story>> {
        let state = self.store.state.read();
        Ok(state
            .stories
            .values()
            .filter(|s| !s.is_complete)
            .max_by_key(|s| (s.created_at, s.story_number))
            .cloned())
    }

    async fn find_all(&self, include_completed: bool) -> StoryResult<Vec<Story>> {
        let state = self.store.state.read();
        let mut stories: Vec<Story> =
            state.stories.values().filter(|s| include_completed || !s.is_complete).cloned().collect();
        stories.sort_by_key(|s| Reverse(s.story_number));
        Ok(stories)
    }

    async fn max_story_number(&self) -> StoryResult<Option<u32>> {
        Ok(self.store.state.read().stories.values().map(|s| s.story_number).max())
    }

    async fn save(&self, story: &Story) -> StoryResult<Story> {
        let mut state = self.store.state.write();
        if state.stories.values().any(|s| s.story_number == story.story_number) {
            return Err(StoryError::conflict("duplicate key value violates stories_story_number_key"));
        }
        state.stories.insert(story.id, story.clone());
        Ok(story.clone())
    }

    async fn update(&self, story: &Story) -> StoryResult<Story> {
        let mut state = self.store.state.write();
        let stored = state
            .stories
            .get_mut(&story.id)
            .ok_or_else(|| StoryError::not_found("Story", story.id))?;
        stored.title.clone_from(&story.title);
        stored.is_complete = story.is_complete;
        stored.completed_at = story.completed_at;
        stored.full_video_url.clone_from(&story.full_video_url);
        Ok(stored.clone())
    }
}

#[async_trait]
impl EpisodeRepository for MemoryEpisodeRepository {
    async fn find_by_story(&self, story_id: StoryId, limit: Option<u32>) -> StoryResult<Vec<Episode>> {
        let state = self.store.state.read();
        let mut episodes: Vec<Episode> = state.episodes.iter().filter(|e| e.story_id == story_id).cloned().collect();
        episodes.sort_by_key(|e| e.episode_number);
        if let Some(limit) = limit {
            episodes.truncate(limit as usize);
        }
        Ok(episodes)
    }

    async fn append(&self, story: &Story, episode: &Episode) -> StoryResult<Episode> {
        let mut state = self.store.state.write();
        let stored = state
            .stories
            .get_mut(&story.id)
            .ok_or_else(|| StoryError::not_found("Story", story.id))?;
        if stored.is_complete || stored.episode_count + 1 != story.episode_count {
            return Err(StoryError::conflict("Story changed while adding the episode, please retry"));
        }
        stored.episode_count = story.episode_count;
        stored.total_duration_seconds = story.total_duration_seconds;
        stored.is_complete = story.is_complete;
        stored.completed_at = story.completed_at;
        state.episodes.push(episode.clone());
        Ok(episode.clone())
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn check(&self) -> HealthStatus {
        HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use storyloop_core::SessionSlot;

    fn session() -> SessionKey {
        SessionKey::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), SessionSlot::Midday)
    }

    #[tokio::test]
    async fn test_upsert_returns_same_user_for_fingerprint() {
        let users = MemoryStore::new().users();
        let now = Utc::now();
        let first = users.upsert_by_fingerprint("fp-1", now).await.unwrap();
        let later = now + Duration::minutes(5);
        let second = users.upsert_by_fingerprint("fp-1", later).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.first_seen, now);
        assert_eq!(second.last_active, later);
        assert_ne!(users.upsert_by_fingerprint("fp-2", now).await.unwrap().id, first.id);
    }

    #[tokio::test]
    async fn test_one_submission_per_author_and_session() {
        let store = MemoryStore::new();
        let author = AnonymousUserId::new();
        let now = Utc::now();
        store.submissions().save(&Submission::new("a brave fox", session(), author, None, now)).await.unwrap();

        let err = store.submissions().save(&Submission::new("a lazy dog", session(), author, None, now)).await.unwrap_err();
        assert!(matches!(err, StoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_ranking_orders_by_votes_then_age() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let older = Submission::new("older phrase", session(), AnonymousUserId::new(), None, now);
        let newer = Submission::new("newer phrase", session(), AnonymousUserId::new(), None, now + Duration::seconds(1));
        let popular = Submission::new("popular phrase", session(), AnonymousUserId::new(), None, now + Duration::seconds(2));
        for s in [&older, &newer, &popular] {
            store.submissions().save(s).await.unwrap();
        }
        store.votes().cast(&Vote::new(popular.id, AnonymousUserId::new(), session(), now)).await.unwrap();

        let ranked = store.submissions().find_by_session(session()).await.unwrap();
        let phrases: Vec<&str> = ranked.iter().map(|s| s.phrase.as_str()).collect();
        assert_eq!(phrases, vec!["popular phrase", "older phrase", "newer phrase"]);
        assert_eq!(store.submissions().find_top_by_session(session()).await.unwrap().unwrap().id, popular.id);
    }

    #[tokio::test]
    async fn test_cast_increments_counter_and_rejects_second_vote() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let target = Submission::new("glowing lantern", session(), AnonymousUserId::new(), None, now);
        store.submissions().save(&target).await.unwrap();
        let voter = AnonymousUserId::new();

        store.votes().cast(&Vote::new(target.id, voter, session(), now)).await.unwrap();
        let err = store.votes().cast(&Vote::new(target.id, voter, session(), now)).await.unwrap_err();
        assert!(matches!(err, StoryError::Conflict(_)));

        let stored = store.submissions().find_by_id(target.id).await.unwrap().unwrap();
        assert_eq!(stored.votes, 1);
        assert!(store.votes().find_by_voter(session(), voter).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cast_for_missing_submission_is_not_found() {
        let store = MemoryStore::new();
        let vote = Vote::new(SubmissionId::new(), AnonymousUserId::new(), session(), Utc::now());
        let err = store.votes().cast(&vote).await.unwrap_err();
        assert!(matches!(err, StoryError::NotFound { .. }));
        assert!(store.votes().find_by_voter(session(), vote.anonymous_user_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_rejects_stale_story() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let story = Story::new(1, None, now);
        store.stories().save(&story).await.unwrap();

        let mut first = story.clone();
        let number = first.record_episode(Some(20), now).unwrap();
        let episode = Episode::new(story.id, number, None, Some(20), "first".into(), None, now);
        store.episodes().append(&first, &episode).await.unwrap();

        // Second writer computed its number from the same snapshot.
        let mut stale = story.clone();
        let number = stale.record_episode(Some(20), now).unwrap();
        let duplicate = Episode::new(story.id, number, None, Some(20), "second".into(), None, now);
        let err = store.episodes().append(&stale, &duplicate).await.unwrap_err();
        assert!(matches!(err, StoryError::Conflict(_)));

        let stored = store.stories().find_by_id(story.id).await.unwrap().unwrap();
        assert_eq!(stored.episode_count, 1);
        assert_eq!(stored.total_duration_seconds, 20);
        assert_eq!(store.episodes().find_by_story(story.id, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_current_skips_completed_stories() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let mut done = Story::new(1, None, now);
        done.complete(None, now).unwrap();
        store.stories().save(&done).await.unwrap();
        assert!(store.stories().find_current().await.unwrap().is_none());

        let open = Story::new(2, None, now + Duration::seconds(1));
        store.stories().save(&open).await.unwrap();
        assert_eq!(store.stories().find_current().await.unwrap().unwrap().id, open.id);
        assert_eq!(store.stories().find_all(false).await.unwrap().len(), 1);
        assert_eq!(store.stories().find_all(true).await.unwrap().len(), 2);
        assert_eq!(store.stories().max_story_number().await.unwrap(), Some(2));
    }
}
