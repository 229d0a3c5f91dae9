//! SurrealDB implementation of [`RoleRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::role::{CreateRole, Role, UpdateRole};
use warden_core::repository::{PaginatedResult, Pagination, RoleRepository};

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct RoleRow {
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct RoleRowWithId {
    record_id: String,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRow {
    fn into_role(self, id: Uuid) -> Role {
        Role {
            id,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl RoleRowWithId {
    fn try_into_role(self) -> Result<Role, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Role {
            id,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Role repository.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn create(&self, input: CreateRole) -> WardenResult<Role> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('role', $id) SET \
                 name = $name, description = $description",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name.clone()))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = match result.check() {
            Ok(r) => r,
            Err(e) if e.to_string().contains("idx_role_name") => {
                return Err(warden_core::error::WardenError::AlreadyExists {
                    entity: format!("role {}", input.name),
                });
            }
            Err(e) => return Err(DbError::Migration(e.to_string()).into()),
        };

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id))
    }

    async fn get_by_id(&self, id: Uuid) -> WardenResult<Role> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('role', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id))
    }

    async fn get_by_name(&self, name: &str) -> WardenResult<Role> {
        let name_owned = name.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 WHERE name = $name",
            )
            .bind(("name", name_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: format!("name={name_owned}"),
        })?;

        Ok(row.try_into_role()?)
    }

    async fn update(&self, id: Uuid, input: UpdateRole) -> WardenResult<Role> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('role', $id) SET {}",
            sets.join(", ")
        );

        let mut result = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id))
    }

    async fn delete(&self, id: Uuid) -> WardenResult<()> {
        let id_str = id.to_string();

        // Delete assignment and grant edges first, then the role record.
        self.db
            .query(format!(
                "DELETE has_role WHERE out = role:`{id_str}`; \
                 DELETE grants WHERE in = role:`{id_str}`; \
                 DELETE type::record('role', $id)"
            ))
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> WardenResult<PaginatedResult<Role>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 ORDER BY name \
                 LIMIT $limit START $offset; \
                 SELECT count() AS total FROM role GROUP ALL",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = result.take(1).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let items = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn assign_to_user(&self, user_id: Uuid, role_id: Uuid) -> WardenResult<()> {
        let user_id_str = user_id.to_string();
        let role_id_str = role_id.to_string();

        let query = format!("RELATE user:`{user_id_str}` -> has_role -> role:`{role_id_str}`;");

        self.db.query(query).await.map_err(DbError::from)?;

        Ok(())
    }

    async fn unassign_from_user(&self, user_id: Uuid, role_id: Uuid) -> WardenResult<()> {
        self.db
            .query(
                "DELETE has_role WHERE \
                 in = type::record('user', $user_id) AND \
                 out = type::record('role', $role_id)",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("role_id", role_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn get_user_roles(&self, user_id: Uuid) -> WardenResult<Vec<Role>> {
        let user_id_str = user_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 WHERE id IN (\
                     SELECT VALUE out FROM has_role \
                     WHERE in = type::record('user', $user_id)\
                 )",
            )
            .bind(("user_id", user_id_str))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;

        let roles = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(roles)
    }
}
