//! Database-specific error types and conversions.

use warden_core::error::WardenError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// A conditional update matched no row: the record exists but is
    /// not in the state the transition requires.
    #[error("Conflicting state for {entity} with id {id}")]
    Conflict { entity: String, id: String },
}

impl From<DbError> for WardenError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => WardenError::NotFound { entity, id },
            DbError::Conflict { entity, id } => WardenError::Conflict { entity, id },
            other => WardenError::Database(other.to_string()),
        }
    }
}
