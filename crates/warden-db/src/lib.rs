//! WARDEN Database — SurrealDB connection management, schema
//! migrations, repository implementations, and catalog seeding.

mod connection;
mod error;
mod schema;
mod seed;

pub mod repository;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::run_migrations;
pub use seed::seed_catalog;
