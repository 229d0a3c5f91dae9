//! SurrealDB implementation of [`UserRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::user::{CreateUser, UpdateUser, User, UserStatus};
use warden_core::repository::{PaginatedResult, Pagination, UserRepository};

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct UserRow {
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<UserStatus, DbError> {
    match s {
        "Active" => Ok(UserStatus::Active),
        "Inactive" => Ok(UserStatus::Inactive),
        other => Err(DbError::Migration(format!("unknown user status: {other}"))),
    }
}

fn status_to_string(s: &UserStatus) -> &'static str {
    match s {
        UserStatus::Active => "Active",
        UserStatus::Inactive => "Inactive",
    }
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Migration(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DbError::Migration(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> WardenResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 email = $email, \
                 password_hash = $password_hash, \
                 first_name = $first_name, last_name = $last_name, \
                 status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email.clone()))
            .bind(("password_hash", password_hash))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("status", "Active".to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = match result.check() {
            Ok(r) => r,
            // The unique email index rejects duplicates.
            Err(e) if e.to_string().contains("idx_user_email") => {
                return Err(warden_core::error::WardenError::AlreadyExists {
                    entity: format!("user with email {}", input.email),
                });
            }
            Err(e) => return Err(DbError::Migration(e.to_string()).into()),
        };

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> WardenResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_email(&self, email: &str) -> WardenResult<User> {
        let email_owned = email.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE email = $email",
            )
            .bind(("email", email_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("email={email_owned}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> WardenResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.first_name.is_some() {
            sets.push("first_name = $first_name");
        }
        if input.last_name.is_some() {
            sets.push("last_name = $last_name");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut result = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("status", input.status.map(|s| status_to_string(&s).to_string())))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn deactivate(&self, id: Uuid) -> WardenResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 status = 'Inactive', updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "user".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> WardenResult<PaginatedResult<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 ORDER BY created_at \
                 LIMIT $limit START $offset; \
                 SELECT count() AS total FROM user GROUP ALL",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = result.take(1).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
