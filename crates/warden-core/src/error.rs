//! Error types for the WARDEN system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WardenError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    /// A conditional state transition matched no row (e.g. rotating a
    /// refresh session that is no longer active).
    #[error("Conflicting state for {entity} with id {id}")]
    Conflict { entity: String, id: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type WardenResult<T> = Result<T, WardenError>;
