//! SurrealDB implementation of [`SessionRepository`].
//!
//! Rotation is the one transactional write in the system: the old
//! session's conditional status update and the replacement's insert
//! commit together or not at all, so two concurrent rotations of the
//! same token can never both succeed.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::session::{CreateSession, RefreshSession, SessionStatus};
use warden_core::repository::SessionRepository;

use crate::error::DbError;

/// Sentinel thrown inside the rotate transaction when the conditional
/// update matches no row; cancels the whole transaction.
const NOT_ACTIVE_SENTINEL: &str = "session_not_active";

/// Map a rotate-transaction failure. Both the explicit sentinel and a
/// commit-time write conflict mean another writer claimed the session
/// first; everything else is a real database error.
fn map_rotate_error(e: surrealdb::Error, old_id: &str) -> DbError {
    let msg = e.to_string();
    if msg.contains(NOT_ACTIVE_SENTINEL) || msg.contains("read or write conflict") {
        DbError::Conflict {
            entity: "session".into(),
            id: old_id.to_string(),
        }
    } else {
        DbError::Migration(msg)
    }
}

#[derive(Debug, SurrealValue)]
struct SessionRow {
    user_id: String,
    status: String,
    supersedes: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<SessionStatus, DbError> {
    match s {
        "Active" => Ok(SessionStatus::Active),
        "Rotated" => Ok(SessionStatus::Rotated),
        "Revoked" => Ok(SessionStatus::Revoked),
        other => Err(DbError::Migration(format!(
            "unknown session status: {other}"
        ))),
    }
}

impl SessionRow {
    fn into_session(self, id: String) -> Result<RefreshSession, DbError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(RefreshSession {
            id,
            user_id,
            status: parse_status(&self.status)?,
            supersedes: self.supersedes,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the refresh session repository.
#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn create(&self, input: CreateSession) -> WardenResult<RefreshSession> {
        let id = input.id.clone();

        let result = self
            .db
            .query(
                "CREATE type::record('session', $id) SET \
                 user_id = $user_id, \
                 status = 'Active', \
                 supersedes = $supersedes, \
                 expires_at = $expires_at",
            )
            .bind(("id", id.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("supersedes", input.supersedes))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id.clone(),
        })?;

        Ok(row.into_session(id)?)
    }

    async fn get_by_id(&self, id: &str) -> WardenResult<RefreshSession> {
        let id_owned = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('session', $id)")
            .bind(("id", id_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id_owned.clone(),
        })?;

        Ok(row.into_session(id_owned)?)
    }

    async fn rotate(
        &self,
        old_id: &str,
        replacement: CreateSession,
    ) -> WardenResult<RefreshSession> {
        let old_id_owned = old_id.to_string();
        let new_id = replacement.id.clone();

        // One transaction: the conditional update either claims the old
        // session (it was still Active) or matches nothing, in which
        // case the THROW cancels the replacement's insert as well.
        let result = self
            .db
            .query(format!(
                "BEGIN TRANSACTION; \
                 LET $old = UPDATE type::record('session', $old_id) \
                     SET status = 'Rotated' \
                     WHERE status = 'Active' \
                     RETURN AFTER; \
                 IF array::len($old) == 0 {{ THROW '{NOT_ACTIVE_SENTINEL}' }}; \
                 CREATE type::record('session', $new_id) SET \
                     user_id = $user_id, \
                     status = 'Active', \
                     supersedes = $old_id, \
                     expires_at = $expires_at; \
                 COMMIT TRANSACTION;"
            ))
            .bind(("old_id", old_id_owned.clone()))
            .bind(("new_id", new_id.clone()))
            .bind(("user_id", replacement.user_id.to_string()))
            .bind(("expires_at", replacement.expires_at))
            .await
            .map_err(|e| map_rotate_error(e, &old_id_owned))?;

        result
            .check()
            .map_err(|e| map_rotate_error(e, &old_id_owned))?;

        self.get_by_id(&new_id).await
    }

    async fn revoke(&self, id: &str) -> WardenResult<()> {
        let id_owned = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('session', $id) \
                 SET status = 'Revoked' \
                 WHERE status = 'Active' \
                 RETURN AFTER",
            )
            .bind(("id", id_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let updated: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        if !updated.is_empty() {
            return Ok(());
        }

        // Nothing matched: either the session does not exist, or it is
        // already in a terminal state.
        let mut existing = self
            .db
            .query("SELECT * FROM type::record('session', $id)")
            .bind(("id", id_owned.clone()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<SessionRow> = existing.take(0).map_err(DbError::from)?;

        if rows.is_empty() {
            Err(DbError::NotFound {
                entity: "session".into(),
                id: id_owned,
            }
            .into())
        } else {
            Err(DbError::Conflict {
                entity: "session".into(),
                id: id_owned,
            }
            .into())
        }
    }

    async fn revoke_user_sessions(&self, user_id: Uuid) -> WardenResult<()> {
        self.db
            .query(
                "UPDATE session SET status = 'Revoked' \
                 WHERE user_id = $user_id AND status = 'Active'",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn cleanup_expired(&self) -> WardenResult<u64> {
        // Count expired sessions first, then delete.
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM session \
                 WHERE expires_at < time::now() \
                 GROUP ALL",
            )
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query("DELETE session WHERE expires_at < time::now()")
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }
}
