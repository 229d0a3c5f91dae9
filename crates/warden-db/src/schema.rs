//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD first_name ON TABLE user TYPE string;
DEFINE FIELD last_name ON TABLE user TYPE string;
DEFINE FIELD status ON TABLE user TYPE string \
    ASSERT $value IN ['Active', 'Inactive'];
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Roles
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD description ON TABLE role TYPE string;
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_name ON TABLE role COLUMNS name UNIQUE;

-- =======================================================================
-- Permissions (immutable catalog entries)
-- =======================================================================
DEFINE TABLE permission SCHEMAFULL;
DEFINE FIELD name ON TABLE permission TYPE string;
DEFINE FIELD resource ON TABLE permission TYPE string;
DEFINE FIELD action ON TABLE permission TYPE string;
DEFINE FIELD description ON TABLE permission TYPE string;
DEFINE FIELD created_at ON TABLE permission TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_permission_name ON TABLE permission \
    COLUMNS name UNIQUE;

-- =======================================================================
-- Refresh sessions (keyed by refresh-token jti)
-- =======================================================================
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD user_id ON TABLE session TYPE string;
DEFINE FIELD status ON TABLE session TYPE string \
    ASSERT $value IN ['Active', 'Rotated', 'Revoked'];
DEFINE FIELD supersedes ON TABLE session TYPE option<string>;
DEFINE FIELD expires_at ON TABLE session TYPE datetime;
DEFINE FIELD created_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_session_user ON TABLE session COLUMNS user_id;

-- =======================================================================
-- Graph edges
-- =======================================================================
-- User -> Role assignments
DEFINE TABLE has_role TYPE RELATION SCHEMAFULL;

-- Role -> Permission grants
DEFINE TABLE grants TYPE RELATION SCHEMAFULL;
";

// -----------------------------------------------------------------------
// Migration runner
// -----------------------------------------------------------------------

/// Apply all outstanding migrations. Idempotent: already-applied
/// versions are skipped.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;
        }
    }

    Ok(())
}
