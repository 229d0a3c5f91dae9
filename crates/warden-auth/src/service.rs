//! Authentication service — registration, login, refresh rotation, and
//! logout orchestration.

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::session::CreateSession;
use warden_core::models::user::{CreateUser, User};
use warden_core::repository::{RoleRepository, SessionRepository, UserRepository};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::{self, TokenKind};

/// Role automatically assigned at registration, so every activated user
/// has at least one role.
pub const DEFAULT_ROLE: &str = "user";

/// Input for the registration flow.
#[derive(Debug)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// A freshly minted access+refresh pair. Returned by both login and
/// refresh.
#[derive(Debug)]
pub struct TokenPair {
    /// Signed access token (role snapshot embedded).
    pub access_token: String,
    /// Signed refresh token; its `jti` keys the stored session.
    pub refresh_token: String,
    /// Refresh session id (equals the refresh token's `jti`).
    pub session_id: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over repository implementations so the engine has no
/// dependency on the database crate.
pub struct AuthService<U, R, S>
where
    U: UserRepository,
    R: RoleRepository,
    S: SessionRepository,
{
    user_repo: U,
    role_repo: R,
    session_repo: S,
    config: AuthConfig,
}

impl<U, R, S> AuthService<U, R, S>
where
    U: UserRepository,
    R: RoleRepository,
    S: SessionRepository,
{
    pub fn new(user_repo: U, role_repo: R, session_repo: S, config: AuthConfig) -> Self {
        Self {
            user_repo,
            role_repo,
            session_repo,
            config,
        }
    }

    /// Register a new user and assign the default role.
    pub async fn register(&self, input: RegisterInput) -> WardenResult<User> {
        if !password::validate_strength(&input.password, self.config.min_password_length) {
            return Err(WardenError::Validation {
                message: format!(
                    "password must be at least {} characters and contain letters and digits",
                    self.config.min_password_length
                ),
            });
        }

        let user = self
            .user_repo
            .create(CreateUser {
                email: input.email,
                password: input.password,
                first_name: input.first_name,
                last_name: input.last_name,
            })
            .await?;

        let default_role = self.role_repo.get_by_name(DEFAULT_ROLE).await?;
        self.role_repo
            .assign_to_user(user.id, default_role.id)
            .await?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Authenticate with email + password and issue a token pair.
    pub async fn login(&self, input: LoginInput) -> WardenResult<TokenPair> {
        // Unknown email and wrong password collapse into one error kind.
        let user = match self.user_repo.get_by_email(&input.email).await {
            Ok(user) => user,
            Err(WardenError::NotFound { .. }) => {
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )
        .map_err(WardenError::from)?;
        if !valid {
            debug!(user_id = %user.id, "password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        if !user.is_active() {
            return Err(AuthError::UserInactive.into());
        }

        self.issue_pair(&user, None).await
    }

    /// Rotate a refresh token: verify it, consume its session, and mint
    /// a new pair.
    ///
    /// Replaying an already-rotated or revoked token always fails with
    /// the session-not-active kind, regardless of signature validity.
    /// Under two concurrent rotations of one token, exactly one
    /// succeeds; the conditional update in the session store decides
    /// the winner.
    pub async fn refresh(&self, raw_refresh_token: &str) -> WardenResult<TokenPair> {
        let claims = match token::verify_token(raw_refresh_token, TokenKind::Refresh, &self.config)
        {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "refresh token rejected");
                return Err(e.into());
            }
        };

        let session = match self.session_repo.get_by_id(&claims.jti).await {
            Ok(session) => session,
            Err(WardenError::NotFound { .. }) => {
                return Err(AuthError::SessionNotFound.into());
            }
            Err(e) => return Err(e),
        };

        // The user must still exist and be active before the session is
        // consumed; failing here leaves the session usable state intact.
        let user = match self.user_repo.get_by_id(session.user_id).await {
            Ok(user) => user,
            Err(WardenError::NotFound { .. }) => {
                return Err(AuthError::UserInactive.into());
            }
            Err(e) => return Err(e),
        };
        if !user.is_active() {
            return Err(AuthError::UserInactive.into());
        }

        self.issue_pair(&user, Some(session.id)).await
    }

    /// Revoke the session behind a refresh token (logout).
    pub async fn logout(&self, raw_refresh_token: &str) -> WardenResult<()> {
        let claims = match token::verify_token(raw_refresh_token, TokenKind::Refresh, &self.config)
        {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "logout with invalid refresh token");
                return Err(e.into());
            }
        };

        match self.session_repo.revoke(&claims.jti).await {
            Ok(()) => {
                info!(session = %claims.jti, "session revoked");
                Ok(())
            }
            Err(WardenError::NotFound { .. }) => Err(AuthError::SessionNotFound.into()),
            Err(WardenError::Conflict { .. }) => Err(AuthError::SessionNotActive.into()),
            Err(e) => Err(e),
        }
    }

    /// Revoke all sessions for a user (e.g. on password change or admin
    /// deactivation).
    pub async fn revoke_all_sessions(&self, user_id: Uuid) -> WardenResult<()> {
        self.session_repo.revoke_user_sessions(user_id).await
    }

    /// Mint an access+refresh pair for a user. With `rotating` set, the
    /// new session atomically supersedes the given one; otherwise a
    /// fresh lineage is started (login).
    async fn issue_pair(&self, user: &User, rotating: Option<String>) -> WardenResult<TokenPair> {
        let roles = self.role_repo.get_user_roles(user.id).await?;
        let mut role_names: Vec<String> = roles.into_iter().map(|r| r.name).collect();
        role_names.sort();

        let session_id = token::generate_token_id();
        let expires_at =
            Utc::now() + Duration::seconds(self.config.refresh_token_lifetime_secs as i64);
        let replacement = CreateSession {
            id: session_id.clone(),
            user_id: user.id,
            supersedes: rotating.clone(),
            expires_at,
        };

        match rotating {
            Some(old_id) => {
                if let Err(e) = self.session_repo.rotate(&old_id, replacement).await {
                    return match e {
                        WardenError::Conflict { .. } => {
                            warn!(session = %old_id, "refresh token replayed or lost the rotation race");
                            Err(AuthError::SessionNotActive.into())
                        }
                        WardenError::NotFound { .. } => Err(AuthError::SessionNotFound.into()),
                        other => Err(other),
                    };
                }
            }
            None => {
                self.session_repo.create(replacement).await?;
            }
        }

        let refresh_token = token::issue_refresh_token(user.id, &session_id, &self.config)
            .map_err(WardenError::from)?;
        let access_token = token::issue_access_token(user.id, role_names, &self.config)
            .map_err(WardenError::from)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            session_id,
            expires_in: self.config.access_token_lifetime_secs,
        })
    }
}
