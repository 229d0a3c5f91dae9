//! Authorization guard: the request-time permit/deny decision.

use std::collections::BTreeSet;

use tracing::{debug, warn};
use uuid::Uuid;
use warden_core::error::{WardenError, WardenResult};
use warden_core::repository::{PermissionRepository, RoleRepository, UserRepository};

use crate::config::{AuthConfig, RoleSource};
use crate::error::AuthError;
use crate::resolver::PermissionResolver;
use crate::token::{self, TokenKind};

/// The outcome of a successful authorization decision, handed to
/// downstream request handling.
#[derive(Debug, Clone)]
pub struct AuthorizedIdentity {
    pub user_id: Uuid,
    pub roles: Vec<String>,
    pub permissions: BTreeSet<String>,
}

/// Request-time authorization: verify the access token, resolve the
/// effective permission set, and check the required permission.
///
/// The decision is read-only; calling it twice with the same still-valid
/// token and permission yields the same outcome.
pub struct AuthorizationGuard<U, R, P>
where
    U: UserRepository,
    R: RoleRepository,
    P: PermissionRepository,
{
    user_repo: U,
    resolver: PermissionResolver<R, P>,
    config: AuthConfig,
}

impl<U, R, P> AuthorizationGuard<U, R, P>
where
    U: UserRepository,
    R: RoleRepository,
    P: PermissionRepository,
{
    pub fn new(user_repo: U, resolver: PermissionResolver<R, P>, config: AuthConfig) -> Self {
        Self {
            user_repo,
            resolver,
            config,
        }
    }

    /// Authorize a raw bearer token against a required permission.
    ///
    /// Any token-verification failure surfaces as the opaque
    /// authentication error; an authenticated caller lacking the
    /// permission gets the authorization error. Inactive users always
    /// fail closed, so the user record is fetched on every decision
    /// regardless of the role-source policy.
    pub async fn authorize(
        &self,
        raw_token: &str,
        required_permission: &str,
    ) -> WardenResult<AuthorizedIdentity> {
        let claims = match token::verify_token(raw_token, TokenKind::Access, &self.config) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "access token rejected");
                return Err(e.into());
            }
        };

        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| WardenError::from(AuthError::MalformedToken))?;

        let user = match self.user_repo.get_by_id(user_id).await {
            Ok(user) => user,
            Err(WardenError::NotFound { .. }) => {
                debug!(%user_id, "token subject has no user record");
                return Err(AuthError::UserInactive.into());
            }
            Err(e) => return Err(e),
        };
        if !user.is_active() {
            warn!(%user_id, "inactive user presented a valid access token");
            return Err(AuthError::UserInactive.into());
        }

        let (roles, permissions) = match self.config.role_source {
            RoleSource::TokenSnapshot => {
                let permissions = self.resolver.resolve(&claims.roles).await?;
                (claims.roles, permissions)
            }
            RoleSource::CurrentAssignment => self.resolver.resolve_for_user(user_id).await?,
        };

        if !permissions.contains(required_permission) {
            debug!(%user_id, permission = required_permission, "permission denied");
            return Err(AuthError::Forbidden(required_permission.to_string()).into());
        }

        Ok(AuthorizedIdentity {
            user_id,
            roles,
            permissions,
        })
    }
}
