//! Integration tests for the authentication service.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use warden_auth::config::AuthConfig;
use warden_auth::service::{AuthService, LoginInput, RegisterInput};
use warden_auth::token::{self, TokenKind};
use warden_core::error::WardenError;
use warden_core::models::session::SessionStatus;
use warden_core::models::user::{UpdateUser, UserStatus};
use warden_core::repository::{RoleRepository, SessionRepository, UserRepository};
use warden_db::repository::{
    SurrealRoleRepository, SurrealSessionRepository, SurrealUserRepository,
};

type Db = surrealdb::engine::local::Db;
type Service =
    AuthService<SurrealUserRepository<Db>, SurrealRoleRepository<Db>, SurrealSessionRepository<Db>>;

fn test_config() -> AuthConfig {
    AuthConfig {
        access_token_secret: "access-secret-for-tests".into(),
        refresh_token_secret: "refresh-secret-for-tests".into(),
        jwt_issuer: "warden-test".into(),
        ..Default::default()
    }
}

/// Spin up in-memory DB, run migrations, seed the catalog, and build a
/// service with one registered user (`alice`).
async fn setup() -> (Service, Surreal<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    warden_db::run_migrations(&db).await.unwrap();
    warden_db::seed_catalog(&db).await.unwrap();

    let svc = service(&db);
    svc.register(RegisterInput {
        email: "alice@example.com".into(),
        password: "correct-horse-7".into(),
        first_name: "Alice".into(),
        last_name: "Arnold".into(),
    })
    .await
    .unwrap();

    (svc, db)
}

fn service(db: &Surreal<Db>) -> Service {
    AuthService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealRoleRepository::new(db.clone()),
        SurrealSessionRepository::new(db.clone()),
        test_config(),
    )
}

async fn login_alice(svc: &Service) -> warden_auth::TokenPair {
    svc.login(LoginInput {
        email: "alice@example.com".into(),
        password: "correct-horse-7".into(),
    })
    .await
    .unwrap()
}

// -----------------------------------------------------------------------
// Registration
// -----------------------------------------------------------------------

#[tokio::test]
async fn register_assigns_default_role() {
    let (_svc, db) = setup().await;

    let user_repo = SurrealUserRepository::new(db.clone());
    let role_repo = SurrealRoleRepository::new(db.clone());
    let user = user_repo.get_by_email("alice@example.com").await.unwrap();

    let roles = role_repo.get_user_roles(user.id).await.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].name, "user");
    assert_eq!(user.status, UserStatus::Active);
}

#[tokio::test]
async fn register_rejects_weak_password() {
    let (svc, _db) = setup().await;

    let err = svc
        .register(RegisterInput {
            email: "bob@example.com".into(),
            password: "short1".into(),
            first_name: "Bob".into(),
            last_name: "Brown".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, WardenError::Validation { .. }));
}

#[tokio::test]
async fn register_duplicate_email_fails() {
    let (svc, _db) = setup().await;

    let err = svc
        .register(RegisterInput {
            email: "alice@example.com".into(),
            password: "another-pass-9".into(),
            first_name: "Alice".into(),
            last_name: "Again".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, WardenError::AlreadyExists { .. }));
}

// -----------------------------------------------------------------------
// Login
// -----------------------------------------------------------------------

#[tokio::test]
async fn login_happy_path() {
    let (svc, _db) = setup().await;
    let config = test_config();

    let pair = login_alice(&svc).await;
    assert!(!pair.access_token.is_empty());
    assert!(!pair.refresh_token.is_empty());
    assert_eq!(pair.expires_in, config.access_token_lifetime_secs);

    // The access token embeds the role snapshot.
    let claims = token::verify_token(&pair.access_token, TokenKind::Access, &config).unwrap();
    assert_eq!(claims.roles, vec!["user".to_string()]);
    assert_eq!(claims.iss, "warden-test");

    // The refresh token's jti is the session id.
    let claims = token::verify_token(&pair.refresh_token, TokenKind::Refresh, &config).unwrap();
    assert_eq!(claims.jti, pair.session_id);
}

#[tokio::test]
async fn login_wrong_password() {
    let (svc, _db) = setup().await;

    let err = svc
        .login(LoginInput {
            email: "alice@example.com".into(),
            password: "wrong-password-1".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, WardenError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn login_unknown_email_fails_like_wrong_password() {
    let (svc, _db) = setup().await;

    let wrong_password = svc
        .login(LoginInput {
            email: "alice@example.com".into(),
            password: "wrong-password-1".into(),
        })
        .await
        .unwrap_err();
    let unknown_email = svc
        .login(LoginInput {
            email: "nobody@example.com".into(),
            password: "irrelevant-9".into(),
        })
        .await
        .unwrap_err();

    // Indistinguishable outcomes; the response is not a user oracle.
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn login_inactive_user() {
    let (svc, db) = setup().await;

    let user_repo = SurrealUserRepository::new(db.clone());
    let user = user_repo.get_by_email("alice@example.com").await.unwrap();
    user_repo.deactivate(user.id).await.unwrap();

    let err = svc
        .login(LoginInput {
            email: "alice@example.com".into(),
            password: "correct-horse-7".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, WardenError::AuthenticationFailed { .. }));
}

// -----------------------------------------------------------------------
// Refresh rotation
// -----------------------------------------------------------------------

#[tokio::test]
async fn refresh_happy_path() {
    let (svc, db) = setup().await;
    let config = test_config();

    let login = login_alice(&svc).await;
    let refreshed = svc.refresh(&login.refresh_token).await.unwrap();

    assert_ne!(refreshed.refresh_token, login.refresh_token);
    assert_ne!(refreshed.session_id, login.session_id);

    let claims = token::verify_token(&refreshed.access_token, TokenKind::Access, &config).unwrap();
    assert_eq!(claims.roles, vec!["user".to_string()]);

    // The old session is rotated; the new one is active and chained to it.
    let session_repo = SurrealSessionRepository::new(db.clone());
    let old = session_repo.get_by_id(&login.session_id).await.unwrap();
    let new = session_repo.get_by_id(&refreshed.session_id).await.unwrap();
    assert_eq!(old.status, SessionStatus::Rotated);
    assert_eq!(new.status, SessionStatus::Active);
    assert_eq!(new.supersedes.as_deref(), Some(login.session_id.as_str()));
}

#[tokio::test]
async fn refresh_replay_fails() {
    let (svc, _db) = setup().await;

    let login = login_alice(&svc).await;
    svc.refresh(&login.refresh_token).await.unwrap();

    // The consumed token is rejected even though its signature and
    // expiry are still valid.
    let err = svc.refresh(&login.refresh_token).await.unwrap_err();
    assert!(matches!(err, WardenError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn refresh_with_access_token_fails() {
    let (svc, _db) = setup().await;

    let login = login_alice(&svc).await;
    let err = svc.refresh(&login.access_token).await.unwrap_err();
    assert!(matches!(err, WardenError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn refresh_bogus_token_fails() {
    let (svc, _db) = setup().await;

    let err = svc.refresh("totally-bogus-token").await.unwrap_err();
    assert!(matches!(err, WardenError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn refresh_after_deactivation_fails() {
    let (svc, db) = setup().await;

    let login = login_alice(&svc).await;

    let user_repo = SurrealUserRepository::new(db.clone());
    let user = user_repo.get_by_email("alice@example.com").await.unwrap();
    user_repo
        .update(
            user.id,
            UpdateUser {
                status: Some(UserStatus::Inactive),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = svc.refresh(&login.refresh_token).await.unwrap_err();
    assert!(matches!(err, WardenError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn concurrent_refresh_exactly_one_succeeds() {
    let (svc, db) = setup().await;
    let svc2 = service(&db);

    let login = login_alice(&svc).await;

    let (a, b) = tokio::join!(
        svc.refresh(&login.refresh_token),
        svc2.refresh(&login.refresh_token),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "exactly one concurrent refresh may win");

    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(
        loser.unwrap_err(),
        WardenError::AuthenticationFailed { .. }
    ));
}

// -----------------------------------------------------------------------
// Logout & revocation
// -----------------------------------------------------------------------

#[tokio::test]
async fn logout_then_refresh_fails() {
    let (svc, _db) = setup().await;

    let login = login_alice(&svc).await;
    svc.logout(&login.refresh_token).await.unwrap();

    let err = svc.refresh(&login.refresh_token).await.unwrap_err();
    assert!(matches!(err, WardenError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn logout_twice_fails() {
    let (svc, _db) = setup().await;

    let login = login_alice(&svc).await;
    svc.logout(&login.refresh_token).await.unwrap();

    // Revoked is terminal.
    let err = svc.logout(&login.refresh_token).await.unwrap_err();
    assert!(matches!(err, WardenError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn revoke_all_sessions() {
    let (svc, db) = setup().await;

    let login1 = login_alice(&svc).await;
    let login2 = login_alice(&svc).await;

    let user_repo = SurrealUserRepository::new(db.clone());
    let user = user_repo.get_by_email("alice@example.com").await.unwrap();
    svc.revoke_all_sessions(user.id).await.unwrap();

    let err1 = svc.refresh(&login1.refresh_token).await.unwrap_err();
    assert!(matches!(err1, WardenError::AuthenticationFailed { .. }));

    let err2 = svc.refresh(&login2.refresh_token).await.unwrap_err();
    assert!(matches!(err2, WardenError::AuthenticationFailed { .. }));
}
