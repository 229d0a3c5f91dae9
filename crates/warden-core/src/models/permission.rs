//! Permission domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;

/// An immutable catalog entry naming one `(resource, action)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    /// Canonical identifier, `"{resource}:{action}"` (e.g. `documents:create`).
    pub name: String,
    pub resource: String,
    pub action: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermission {
    pub resource: String,
    pub action: String,
    pub description: String,
}

impl CreatePermission {
    /// The canonical permission name this entry will be stored under.
    pub fn name(&self) -> String {
        catalog::permission_name(&self.resource, &self.action)
    }
}
