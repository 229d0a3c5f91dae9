//! Idempotent seeding of the built-in permission catalog and roles.

use std::collections::HashMap;

use surrealdb::{Connection, Surreal};
use tracing::info;
use uuid::Uuid;
use warden_core::catalog::{BUILTIN_PERMISSIONS, permission_name};
use warden_core::error::WardenResult;
use warden_core::models::permission::CreatePermission;
use warden_core::models::role::CreateRole;
use warden_core::repository::{Pagination, PermissionRepository, RoleRepository};

use crate::repository::{SurrealPermissionRepository, SurrealRoleRepository};

/// Permission names granted to the `user` role.
const USER_GRANTS: &[&str] = &[
    "documents:read",
    "reports:read",
    "profiles:read",
    "profiles:edit",
];

/// Permission names granted to the `moderator` role. A user holding
/// both `user` and `moderator` gets the union of the two sets.
const MODERATOR_GRANTS: &[&str] = &[
    "documents:read",
    "documents:create",
    "documents:edit",
    "documents:delete",
    "reports:read",
    "reports:create",
    "reports:export",
    "profiles:read",
];

/// Seed the built-in permission catalog and the three shipped roles
/// (`admin` gets every permission, `user` and `moderator` their grant
/// lists). Skips entirely when permissions already exist, so it is safe
/// to run on every startup.
pub async fn seed_catalog<C: Connection>(db: &Surreal<C>) -> WardenResult<()> {
    let permission_repo = SurrealPermissionRepository::new(db.clone());
    let role_repo = SurrealRoleRepository::new(db.clone());

    if permission_repo.list(Pagination::default()).await?.total > 0 {
        info!("catalog already seeded, skipping");
        return Ok(());
    }

    let mut permission_ids: HashMap<String, Uuid> = HashMap::new();
    for &(resource, action, description) in BUILTIN_PERMISSIONS {
        let permission = permission_repo
            .create(CreatePermission {
                resource: resource.into(),
                action: action.into(),
                description: description.into(),
            })
            .await?;
        permission_ids.insert(permission.name.clone(), permission.id);
    }

    let all_names: Vec<String> = BUILTIN_PERMISSIONS
        .iter()
        .map(|&(r, a, _)| permission_name(r, a))
        .collect();

    let roles: &[(&str, &str, &[&str])] = &[
        (
            "admin",
            "Administrator with full access to every resource",
            &[],
        ),
        ("user", "Standard user with read-mostly access", USER_GRANTS),
        (
            "moderator",
            "Content manager for documents and reports",
            MODERATOR_GRANTS,
        ),
    ];

    for &(name, description, grant_names) in roles {
        let role = role_repo
            .create(CreateRole {
                name: name.into(),
                description: description.into(),
            })
            .await?;

        // Empty grant list means "everything" (admin).
        let grants: Vec<&str> = if grant_names.is_empty() {
            all_names.iter().map(String::as_str).collect()
        } else {
            grant_names.to_vec()
        };

        for grant in grants {
            let permission_id = permission_ids[grant];
            permission_repo
                .grant_to_role(role.id, permission_id)
                .await?;
        }

        info!(role = name, "seeded role");
    }

    Ok(())
}
