//! Role-permission resolver: effective permission sets as the union
//! over a user's assigned roles.

use std::collections::BTreeSet;

use uuid::Uuid;
use warden_core::error::{WardenError, WardenResult};
use warden_core::repository::{PermissionRepository, RoleRepository};

/// Computes effective permission sets from role identifiers.
///
/// Resolution is read-only over the current role→permission catalog:
/// deterministic, order-independent, and idempotent. The union over a
/// combined role set equals the union of the per-role resolutions.
pub struct PermissionResolver<R: RoleRepository, P: PermissionRepository> {
    role_repo: R,
    permission_repo: P,
}

impl<R: RoleRepository, P: PermissionRepository> PermissionResolver<R, P> {
    pub fn new(role_repo: R, permission_repo: P) -> Self {
        Self {
            role_repo,
            permission_repo,
        }
    }

    /// Union of permission names across all *known* roles.
    ///
    /// Unknown role names are skipped, not an error: a role deleted
    /// after token issuance silently contributes no permissions.
    pub async fn resolve(&self, role_names: &[String]) -> WardenResult<BTreeSet<String>> {
        let mut permissions = BTreeSet::new();
        for name in role_names {
            let role = match self.role_repo.get_by_name(name).await {
                Ok(role) => role,
                Err(WardenError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            };
            for permission in self.permission_repo.get_role_permissions(role.id).await? {
                permissions.insert(permission.name);
            }
        }
        Ok(permissions)
    }

    /// Resolve against the user's *current* role assignment instead of
    /// a token snapshot. Returns the role names alongside the union so
    /// callers can report both.
    pub async fn resolve_for_user(
        &self,
        user_id: Uuid,
    ) -> WardenResult<(Vec<String>, BTreeSet<String>)> {
        let roles = self.role_repo.get_user_roles(user_id).await?;

        let mut names = Vec::with_capacity(roles.len());
        let mut permissions = BTreeSet::new();
        for role in roles {
            for permission in self.permission_repo.get_role_permissions(role.id).await? {
                permissions.insert(permission.name);
            }
            names.push(role.name);
        }
        names.sort();
        Ok((names, permissions))
    }
}
