//! Repository traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use storyloop_core::{
    AnonymousUser, AnonymousUserId, Episode, Interface, SessionKey, Story, StoryId, StoryResult, Submission,
    SubmissionId, Vote,
};

/// Anonymous participant storage.
#[async_trait]
pub trait AnonymousUserRepository: Interface + Send + Sync {
    /// Returns the user owning `fingerprint`, creating it when unseen, and
    /// records activity at `now`.
    async fn upsert_by_fingerprint(&self, fingerprint: &str, now: DateTime<Utc>) -> StoryResult<AnonymousUser>;

    /// Finds a user by ID.
    async fn find_by_id(&self, id: AnonymousUserId) -> StoryResult<Option<AnonymousUser>>;
}

/// Submission storage.
#[async_trait]
pub trait SubmissionRepository: Interface + Send + Sync {
    /// Finds a submission by ID.
    async fn find_by_id(&self, id: SubmissionId) -> StoryResult<Option<Submission>>;

    /// Submissions of a slot ranked by votes desc, then age asc.
    async fn find_by_session(&self, session: SessionKey) -> StoryResult<Vec<Submission>>;

    /// The highest ranked submission of a slot.
    async fn find_top_by_session(&self, session: SessionKey) -> StoryResult<Option<Submission>>;

    /// The submission `author` made in a slot.
    async fn find_by_author(&self, session: SessionKey, author: AnonymousUserId) -> StoryResult<Option<Submission>>;

    /// Inserts a submission.
    ///
    /// Fails with `Conflict` when the author already submitted in the slot.
    async fn save(&self, submission: &Submission) -> StoryResult<Submission>;
}

/// Vote storage.
#[async_trait]
pub trait VoteRepository: Interface + Send + Sync {
    /// The vote `voter` cast in a slot.
    async fn find_by_voter(&self, session: SessionKey, voter: AnonymousUserId) -> StoryResult<Option<Vote>>;

    /// Inserts a vote and increments the target's counter atomically.
    ///
    /// Fails with `Conflict` when the voter already voted in the slot and
    /// with `NotFound` when the submission is gone.
    async fn cast(&self, vote: &Vote) -> StoryResult<Vote>;
}

/// Story storage.
#[async_trait]
pub trait StoryRepository: Interface + Send + Sync {
    /// Finds a story by ID.
    async fn find_by_id(&self, id: StoryId) -> StoryResult<Option<Story>>;

    /// The most recently created incomplete story.
    async fn find_current(&self) -> StoryResult<Option<Story>>;

    /// Stories by number desc; incomplete only unless `include_completed`.
    async fn find_all(&self, include_completed: bool) -> StoryResult<Vec<Story>>;

    /// Highest story number in use.
    async fn max_story_number(&self) -> StoryResult<Option<u32>>;

    /// Inserts a story. Fails with `Conflict` on a duplicate number.
    async fn save(&self, story: &Story) -> StoryResult<Story>;

    /// Persists completion state of a story.
    async fn update(&self, story: &Story) -> StoryResult<Story>;
}

/// Episode storage.
#[async_trait]
pub trait EpisodeRepository: Interface + Send + Sync {
    /// Episodes of a story in order, optionally only the first `limit`.
    async fn find_by_story(&self, story_id: StoryId, limit: Option<u32>) -> StoryResult<Vec<Episode>>;

    /// Inserts `episode` and writes the counters of `story` in one unit.
    ///
    /// `story` must already account for the episode. Fails with `Conflict`
    /// when another episode was appended in between or the stored story is
    /// complete.
    async fn append(&self, story: &Story, episode: &Episode) -> StoryResult<Episode>;
}
