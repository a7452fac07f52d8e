//! Integration tests for the PostgreSQL repositories.
//!
//! These tests run against a real PostgreSQL database using testcontainers.
//! Requires Docker to be available on the system.

mod common;

use chrono::{DateTime, Duration, NaiveDate, SubsecRound, Utc};
use common::TestDatabase;
use storyloop_core::{
    AnonymousUserId, Episode, SessionKey, SessionSlot, Story, StoryError, StoryId, Submission, SubmissionId, Vote,
};
use storyloop_repository::{
    seed_demo_story, AnonymousUserRepository, EpisodeRepository, PgAnonymousUserRepository, PgEpisodeRepository,
    PgStoryRepository, PgSubmissionRepository, PgVoteRepository, StoryRepository, SubmissionRepository,
    VoteRepository,
};

// PostgreSQL keeps microseconds.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn session() -> SessionKey {
    SessionKey::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), SessionSlot::LateMorning)
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_upsert_anonymous_user() {
    let db = TestDatabase::new().await;
    let repo = PgAnonymousUserRepository::new(db.pool());
    let first_seen = now();

    let created = repo.upsert_by_fingerprint("fp-abc", first_seen).await.expect("upsert failed");
    let later = first_seen + Duration::minutes(3);
    let again = repo.upsert_by_fingerprint("fp-abc", later).await.expect("upsert failed");

    assert_eq!(created.id, again.id);
    assert_eq!(again.first_seen, first_seen);
    assert_eq!(again.last_active, later);

    let found = repo.find_by_id(created.id).await.expect("query failed").expect("user not found");
    assert_eq!(found.fingerprint, "fp-abc");
    assert!(repo.find_by_id(AnonymousUserId::new()).await.expect("query failed").is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_submission_uniqueness_and_ranking() {
    let db = TestDatabase::new().await;
    let submissions = PgSubmissionRepository::new(db.pool());
    let votes = PgVoteRepository::new(db.pool());
    let t0 = now();

    let author = AnonymousUserId::new();
    let first = Submission::new("  Silver   moon rises ", session(), author, Some("hash".into()), t0);
    let saved = submissions.save(&first).await.expect("Failed to save submission");
    assert_eq!(saved.phrase, "Silver moon rises");
    assert_eq!(saved.word_count, 3);
    assert_eq!(saved.ip_hash.as_deref(), Some("hash"));

    let duplicate = Submission::new("another idea", session(), author, None, t0);
    let err = submissions.save(&duplicate).await.unwrap_err();
    assert!(matches!(err, StoryError::Conflict(_)));

    let second = Submission::new("quiet river", session(), AnonymousUserId::new(), None, t0 + Duration::seconds(1));
    submissions.save(&second).await.expect("Failed to save submission");
    votes
        .cast(&Vote::new(second.id, AnonymousUserId::new(), session(), t0))
        .await
        .expect("Failed to cast vote");

    let ranked = submissions.find_by_session(session()).await.expect("query failed");
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].id, second.id);
    assert_eq!(ranked[0].votes, 1);
    assert_eq!(ranked[1].id, first.id);

    let top = submissions.find_top_by_session(session()).await.expect("query failed").expect("no winner");
    assert_eq!(top.id, second.id);
    assert!(submissions.find_by_author(session(), author).await.expect("query failed").is_some());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_vote_once_per_session() {
    let db = TestDatabase::new().await;
    let submissions = PgSubmissionRepository::new(db.pool());
    let votes = PgVoteRepository::new(db.pool());
    let target = Submission::new("hidden key", session(), AnonymousUserId::new(), None, now());
    submissions.save(&target).await.expect("Failed to save submission");

    let voter = AnonymousUserId::new();
    votes.cast(&Vote::new(target.id, voter, session(), now())).await.expect("Failed to cast vote");
    let err = votes.cast(&Vote::new(target.id, voter, session(), now())).await.unwrap_err();
    assert!(matches!(err, StoryError::Conflict(_)));

    let stored = submissions.find_by_id(target.id).await.expect("query failed").expect("missing");
    assert_eq!(stored.votes, 1, "rolled back vote must not leave a counted increment");

    let missing = votes
        .cast(&Vote::new(SubmissionId::new(), AnonymousUserId::new(), session(), now()))
        .await
        .unwrap_err();
    assert!(matches!(missing, StoryError::NotFound { .. }));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_story_lifecycle() {
    let db = TestDatabase::new().await;
    let stories = PgStoryRepository::new(db.pool());
    let episodes = PgEpisodeRepository::new(db.pool());
    let t0 = now();

    assert_eq!(stories.max_story_number().await.expect("query failed"), None);
    let story = stories.save(&Story::new(1, None, t0)).await.expect("Failed to save story");
    assert_eq!(story.title.as_deref(), Some("Story #1"));

    let mut current = stories.find_current().await.expect("query failed").expect("no current story");
    let number = current.record_episode(Some(300), t0).expect("record failed");
    let episode = Episode::new(current.id, number, None, Some(300), "first scene".into(), None, t0);
    episodes.append(&current, &episode).await.expect("Failed to append episode");

    // A writer working from the stale snapshot loses.
    let mut stale = story.clone();
    let number = stale.record_episode(Some(10), t0).expect("record failed");
    let late = Episode::new(story.id, number, None, Some(10), "late scene".into(), None, t0);
    assert!(matches!(episodes.append(&stale, &late).await.unwrap_err(), StoryError::Conflict(_)));

    let number = current.record_episode(Some(150), t0).expect("record failed");
    assert!(current.is_complete);
    let closing = Episode::new(current.id, number, None, Some(150), "second scene".into(), None, t0);
    episodes.append(&current, &closing).await.expect("Failed to append episode");

    let stored = stories.find_by_id(story.id).await.expect("query failed").expect("missing");
    assert_eq!(stored.episode_count, 2);
    assert_eq!(stored.total_duration_seconds, 450);
    assert!(stored.is_complete);
    assert!(stories.find_current().await.expect("query failed").is_none());

    let mut finished = stored.clone();
    finished.complete(Some("https://cdn.example/full.mp4".into()), t0).expect("complete failed");
    let updated = stories.update(&finished).await.expect("Failed to update story");
    assert_eq!(updated.full_video_url.as_deref(), Some("https://cdn.example/full.mp4"));

    assert!(stories.find_all(false).await.expect("query failed").is_empty());
    assert_eq!(stories.find_all(true).await.expect("query failed").len(), 1);
    assert_eq!(episodes.find_by_story(story.id, Some(1)).await.expect("query failed").len(), 1);
    assert!(episodes.find_by_story(StoryId::new(), None).await.expect("query failed").is_empty());

    let dup = stories.save(&Story::new(1, None, t0)).await.unwrap_err();
    assert!(matches!(dup, StoryError::Conflict(_)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_seed_demo_story() {
    let db = TestDatabase::new().await;
    let stories = PgStoryRepository::new(db.pool());
    let episodes = PgEpisodeRepository::new(db.pool());

    assert!(seed_demo_story(&stories, &episodes, now()).await.expect("seed failed"));
    assert!(!seed_demo_story(&stories, &episodes, now()).await.expect("seed failed"));

    let story = stories.find_current().await.expect("query failed").expect("no story");
    assert_eq!(story.episode_count, 3);
    assert_eq!(story.total_duration_seconds, 60);
}
