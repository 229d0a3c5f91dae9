//! WARDEN Core — domain models, the permission catalog, repository
//! traits, and the workspace-wide error type.

pub mod catalog;
pub mod error;
pub mod models;
pub mod repository;

pub use error::{WardenError, WardenResult};
