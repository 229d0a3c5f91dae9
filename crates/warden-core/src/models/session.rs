//! Refresh session domain model.
//!
//! One row per issued refresh token, keyed by the token's `jti`. The
//! status field is a three-state machine: `Active → Rotated` on refresh,
//! `Active → Revoked` on logout or admin revocation. `Rotated` and
//! `Revoked` are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Rotated,
    Revoked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSession {
    /// Token identifier (`jti` claim of the refresh token that owns
    /// this session). 32 random bytes, base64url.
    pub id: String,
    pub user_id: Uuid,
    pub status: SessionStatus,
    /// Id of the session this one replaced on rotation, if any. Keeps
    /// the audit chain of a login lineage intact.
    pub supersedes: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    /// Token identifier minted by the codec; becomes the row key.
    pub id: String,
    pub user_id: Uuid,
    pub supersedes: Option<String>,
    pub expires_at: DateTime<Utc>,
}
