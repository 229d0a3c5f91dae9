//! Integration tests for the refresh session repository — in
//! particular the atomicity of rotation.

use chrono::{Duration, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;
use warden_core::error::WardenError;
use warden_core::models::session::{CreateSession, SessionStatus};
use warden_core::repository::SessionRepository;
use warden_db::repository::SurrealSessionRepository;

type Db = surrealdb::engine::local::Db;

async fn setup() -> (SurrealSessionRepository<Db>, Surreal<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    warden_db::run_migrations(&db).await.unwrap();

    (SurrealSessionRepository::new(db.clone()), db)
}

/// 43-char base64url id, the shape the token codec produces.
fn token_id(tag: &str) -> String {
    format!("{tag:_<43}")
}

fn new_session(id: &str, user_id: Uuid) -> CreateSession {
    CreateSession {
        id: id.to_string(),
        user_id,
        supersedes: None,
        expires_at: Utc::now() + Duration::days(7),
    }
}

#[tokio::test]
async fn create_and_get_session() {
    let (repo, _db) = setup().await;
    let user_id = Uuid::new_v4();
    let id = token_id("s1");

    let created = repo.create(new_session(&id, user_id)).await.unwrap();
    assert_eq!(created.status, SessionStatus::Active);
    assert_eq!(created.supersedes, None);

    let fetched = repo.get_by_id(&id).await.unwrap();
    assert_eq!(fetched.id, id);
    assert_eq!(fetched.user_id, user_id);
    assert_eq!(fetched.status, SessionStatus::Active);
}

#[tokio::test]
async fn get_missing_session_not_found() {
    let (repo, _db) = setup().await;

    let err = repo.get_by_id(&token_id("missing")).await.unwrap_err();
    assert!(matches!(err, WardenError::NotFound { .. }));
}

#[tokio::test]
async fn rotate_marks_old_and_links_new() {
    let (repo, _db) = setup().await;
    let user_id = Uuid::new_v4();
    let old_id = token_id("old");
    let new_id = token_id("new");

    repo.create(new_session(&old_id, user_id)).await.unwrap();
    let rotated = repo
        .rotate(&old_id, new_session(&new_id, user_id))
        .await
        .unwrap();

    assert_eq!(rotated.id, new_id);
    assert_eq!(rotated.status, SessionStatus::Active);
    assert_eq!(rotated.supersedes.as_deref(), Some(old_id.as_str()));

    let old = repo.get_by_id(&old_id).await.unwrap();
    assert_eq!(old.status, SessionStatus::Rotated);
}

#[tokio::test]
async fn rotate_missing_session_not_found() {
    let (repo, _db) = setup().await;

    let err = repo
        .rotate(
            &token_id("missing"),
            new_session(&token_id("new"), Uuid::new_v4()),
        )
        .await
        .unwrap_err();

    // The conditional update matches nothing, so the transaction
    // cancels and the replacement row is never created.
    assert!(matches!(err, WardenError::Conflict { .. }));
    assert!(matches!(
        repo.get_by_id(&token_id("new")).await.unwrap_err(),
        WardenError::NotFound { .. }
    ));
}

#[tokio::test]
async fn rotate_consumed_session_conflicts() {
    let (repo, _db) = setup().await;
    let user_id = Uuid::new_v4();
    let old_id = token_id("old");

    repo.create(new_session(&old_id, user_id)).await.unwrap();
    repo.rotate(&old_id, new_session(&token_id("first"), user_id))
        .await
        .unwrap();

    // Replaying the consumed session must not mint another lineage.
    let err = repo
        .rotate(&old_id, new_session(&token_id("second"), user_id))
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::Conflict { .. }));
}

#[tokio::test]
async fn concurrent_rotation_has_single_winner() {
    let (repo, db) = setup().await;
    let repo2 = SurrealSessionRepository::new(db.clone());
    let user_id = Uuid::new_v4();
    let old_id = token_id("contested");

    repo.create(new_session(&old_id, user_id)).await.unwrap();

    let (a, b) = tokio::join!(
        repo.rotate(&old_id, new_session(&token_id("winner-a"), user_id)),
        repo2.rotate(&old_id, new_session(&token_id("winner-b"), user_id)),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "exactly one rotation may claim the session");

    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser.unwrap_err(), WardenError::Conflict { .. }));
}

#[tokio::test]
async fn revoke_active_session() {
    let (repo, _db) = setup().await;
    let id = token_id("s1");

    repo.create(new_session(&id, Uuid::new_v4())).await.unwrap();
    repo.revoke(&id).await.unwrap();

    let session = repo.get_by_id(&id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Revoked);
}

#[tokio::test]
async fn revoke_is_not_repeatable() {
    let (repo, _db) = setup().await;
    let id = token_id("s1");

    repo.create(new_session(&id, Uuid::new_v4())).await.unwrap();
    repo.revoke(&id).await.unwrap();

    let err = repo.revoke(&id).await.unwrap_err();
    assert!(matches!(err, WardenError::Conflict { .. }));
}

#[tokio::test]
async fn revoke_missing_session_not_found() {
    let (repo, _db) = setup().await;

    let err = repo.revoke(&token_id("missing")).await.unwrap_err();
    assert!(matches!(err, WardenError::NotFound { .. }));
}

#[tokio::test]
async fn rotated_session_cannot_be_revoked() {
    let (repo, _db) = setup().await;
    let user_id = Uuid::new_v4();
    let old_id = token_id("old");

    repo.create(new_session(&old_id, user_id)).await.unwrap();
    repo.rotate(&old_id, new_session(&token_id("new"), user_id))
        .await
        .unwrap();

    // Terminal states never transition further.
    let err = repo.revoke(&old_id).await.unwrap_err();
    assert!(matches!(err, WardenError::Conflict { .. }));

    let old = repo.get_by_id(&old_id).await.unwrap();
    assert_eq!(old.status, SessionStatus::Rotated);
}

#[tokio::test]
async fn revoke_user_sessions_covers_all_active() {
    let (repo, _db) = setup().await;
    let user_id = Uuid::new_v4();
    let other_user = Uuid::new_v4();

    repo.create(new_session(&token_id("a"), user_id))
        .await
        .unwrap();
    repo.create(new_session(&token_id("b"), user_id))
        .await
        .unwrap();
    repo.create(new_session(&token_id("c"), other_user))
        .await
        .unwrap();

    repo.revoke_user_sessions(user_id).await.unwrap();

    for id in ["a", "b"] {
        let session = repo.get_by_id(&token_id(id)).await.unwrap();
        assert_eq!(session.status, SessionStatus::Revoked);
    }
    let untouched = repo.get_by_id(&token_id("c")).await.unwrap();
    assert_eq!(untouched.status, SessionStatus::Active);
}

#[tokio::test]
async fn cleanup_removes_only_expired() {
    let (repo, _db) = setup().await;
    let user_id = Uuid::new_v4();

    repo.create(new_session(&token_id("live"), user_id))
        .await
        .unwrap();
    repo.create(CreateSession {
        id: token_id("stale"),
        user_id,
        supersedes: None,
        expires_at: Utc::now() - Duration::hours(1),
    })
    .await
    .unwrap();

    let removed = repo.cleanup_expired().await.unwrap();
    assert_eq!(removed, 1);

    assert!(repo.get_by_id(&token_id("live")).await.is_ok());
    assert!(matches!(
        repo.get_by_id(&token_id("stale")).await.unwrap_err(),
        WardenError::NotFound { .. }
    ));
}
