//! SurrealDB implementation of [`PermissionRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::permission::{CreatePermission, Permission};
use warden_core::repository::{PaginatedResult, Pagination, PermissionRepository};

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PermissionRow {
    name: String,
    resource: String,
    action: String,
    description: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct PermissionRowWithId {
    record_id: String,
    name: String,
    resource: String,
    action: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl PermissionRow {
    fn into_permission(self, id: Uuid) -> Permission {
        Permission {
            id,
            name: self.name,
            resource: self.resource,
            action: self.action,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

impl PermissionRowWithId {
    fn try_into_permission(self) -> Result<Permission, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Permission {
            id,
            name: self.name,
            resource: self.resource,
            action: self.action,
            description: self.description,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Permission repository.
#[derive(Clone)]
pub struct SurrealPermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PermissionRepository for SurrealPermissionRepository<C> {
    async fn create(&self, input: CreatePermission) -> WardenResult<Permission> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let name = input.name();

        let result = self
            .db
            .query(
                "CREATE type::record('permission', $id) SET \
                 name = $name, \
                 resource = $resource, action = $action, \
                 description = $description",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", name.clone()))
            .bind(("resource", input.resource))
            .bind(("action", input.action))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = match result.check() {
            Ok(r) => r,
            Err(e) if e.to_string().contains("idx_permission_name") => {
                return Err(warden_core::error::WardenError::AlreadyExists {
                    entity: format!("permission {name}"),
                });
            }
            Err(e) => return Err(DbError::Migration(e.to_string()).into()),
        };

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: id_str,
        })?;

        Ok(row.into_permission(id))
    }

    async fn get_by_id(&self, id: Uuid) -> WardenResult<Permission> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('permission', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: id_str,
        })?;

        Ok(row.into_permission(id))
    }

    async fn get_by_name(&self, name: &str) -> WardenResult<Permission> {
        let name_owned = name.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE name = $name",
            )
            .bind(("name", name_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: format!("name={name_owned}"),
        })?;

        Ok(row.try_into_permission()?)
    }

    async fn list(&self, pagination: Pagination) -> WardenResult<PaginatedResult<Permission>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 ORDER BY name \
                 LIMIT $limit START $offset; \
                 SELECT count() AS total FROM permission GROUP ALL",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = result.take(1).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let items = rows
            .into_iter()
            .map(|row| row.try_into_permission())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn grant_to_role(&self, role_id: Uuid, permission_id: Uuid) -> WardenResult<()> {
        let role_id_str = role_id.to_string();
        let perm_id_str = permission_id.to_string();

        let query = format!("RELATE role:`{role_id_str}` -> grants -> permission:`{perm_id_str}`;");

        self.db.query(query).await.map_err(DbError::from)?;

        Ok(())
    }

    async fn revoke_from_role(&self, role_id: Uuid, permission_id: Uuid) -> WardenResult<()> {
        self.db
            .query(
                "DELETE grants WHERE \
                 in = type::record('role', $role_id) AND \
                 out = type::record('permission', $perm_id)",
            )
            .bind(("role_id", role_id.to_string()))
            .bind(("perm_id", permission_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn get_role_permissions(&self, role_id: Uuid) -> WardenResult<Vec<Permission>> {
        let role_id_str = role_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE id IN (\
                     SELECT VALUE out FROM grants \
                     WHERE in = type::record('role', $role_id)\
                 )",
            )
            .bind(("role_id", role_id_str))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;

        let permissions = rows
            .into_iter()
            .map(|row| row.try_into_permission())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(permissions)
    }
}
