//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async and read or write a single
//! logical entity set. The session repository's `rotate` is the one
//! operation that must be transactional; everything else is a plain
//! read or independent write.

use uuid::Uuid;

use crate::error::WardenResult;
use crate::models::{
    permission::{CreatePermission, Permission},
    role::{CreateRole, Role, UpdateRole},
    session::{CreateSession, RefreshSession},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = WardenResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WardenResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = WardenResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = WardenResult<User>> + Send;
    /// Soft-delete: sets status to Inactive. Rows are never removed.
    fn deactivate(&self, id: Uuid) -> impl Future<Output = WardenResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = WardenResult<PaginatedResult<User>>> + Send;
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = WardenResult<Role>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WardenResult<Role>> + Send;
    /// Lookup by slug — the identifier embedded in token claims.
    fn get_by_name(&self, name: &str) -> impl Future<Output = WardenResult<Role>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateRole,
    ) -> impl Future<Output = WardenResult<Role>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = WardenResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = WardenResult<PaginatedResult<Role>>> + Send;

    /// Assign a role to a user (creates a `has_role` edge).
    fn assign_to_user(
        &self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = WardenResult<()>> + Send;

    /// Remove a role assignment from a user.
    fn unassign_from_user(
        &self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = WardenResult<()>> + Send;

    /// Get all roles currently assigned to a user.
    fn get_user_roles(&self, user_id: Uuid) -> impl Future<Output = WardenResult<Vec<Role>>> + Send;
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

pub trait PermissionRepository: Send + Sync {
    fn create(
        &self,
        input: CreatePermission,
    ) -> impl Future<Output = WardenResult<Permission>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WardenResult<Permission>> + Send;
    fn get_by_name(&self, name: &str) -> impl Future<Output = WardenResult<Permission>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = WardenResult<PaginatedResult<Permission>>> + Send;

    /// Grant a permission to a role (creates a `grants` edge).
    fn grant_to_role(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = WardenResult<()>> + Send;

    /// Revoke a permission from a role.
    fn revoke_from_role(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = WardenResult<()>> + Send;

    /// Get all permissions granted to a role.
    fn get_role_permissions(
        &self,
        role_id: Uuid,
    ) -> impl Future<Output = WardenResult<Vec<Permission>>> + Send;
}

// ---------------------------------------------------------------------------
// Refresh sessions
// ---------------------------------------------------------------------------

pub trait SessionRepository: Send + Sync {
    /// Insert a new `Active` session (login).
    fn create(
        &self,
        input: CreateSession,
    ) -> impl Future<Output = WardenResult<RefreshSession>> + Send;

    fn get_by_id(&self, id: &str) -> impl Future<Output = WardenResult<RefreshSession>> + Send;

    /// Atomically mark `old_id` as `Rotated` and insert `replacement` as
    /// the new `Active` session linked to it. Both writes commit together
    /// or not at all.
    ///
    /// Fails with [`WardenError::Conflict`] when the old session is not
    /// `Active`; under two concurrent rotations of the same token,
    /// exactly one succeeds.
    fn rotate(
        &self,
        old_id: &str,
        replacement: CreateSession,
    ) -> impl Future<Output = WardenResult<RefreshSession>> + Send;

    /// Mark a single `Active` session as `Revoked` (logout or admin
    /// revocation). Fails with [`WardenError::NotFound`] for unknown ids
    /// and [`WardenError::Conflict`] for sessions already terminal.
    fn revoke(&self, id: &str) -> impl Future<Output = WardenResult<()>> + Send;

    /// Revoke all active sessions for a user (e.g. on password change).
    fn revoke_user_sessions(&self, user_id: Uuid)
    -> impl Future<Output = WardenResult<()>> + Send;

    /// Remove sessions whose expiry has passed. Returns the count removed.
    fn cleanup_expired(&self) -> impl Future<Output = WardenResult<u64>> + Send;
}
