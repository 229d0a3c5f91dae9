//! WARDEN Server — Application entry point.

use std::env;

use tracing_subscriber::EnvFilter;
use warden_auth::AuthConfig;
use warden_db::{DbConfig, DbManager};

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn db_config_from_env() -> DbConfig {
    DbConfig {
        url: env_or("WARDEN_DB_URL", "127.0.0.1:8000"),
        namespace: env_or("WARDEN_DB_NAMESPACE", "warden"),
        database: env_or("WARDEN_DB_DATABASE", "main"),
        username: env_or("WARDEN_DB_USERNAME", "root"),
        password: env_or("WARDEN_DB_PASSWORD", "root"),
    }
}

fn auth_config_from_env() -> AuthConfig {
    AuthConfig {
        access_token_secret: env_or("WARDEN_ACCESS_TOKEN_SECRET", ""),
        refresh_token_secret: env_or("WARDEN_REFRESH_TOKEN_SECRET", ""),
        pepper: env::var("WARDEN_PASSWORD_PEPPER").ok(),
        ..Default::default()
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("warden=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting WARDEN server...");

    let auth_config = auth_config_from_env();
    if auth_config.access_token_secret.is_empty() || auth_config.refresh_token_secret.is_empty() {
        tracing::error!(
            "WARDEN_ACCESS_TOKEN_SECRET and WARDEN_REFRESH_TOKEN_SECRET must be set"
        );
        std::process::exit(1);
    }
    if auth_config.access_token_secret == auth_config.refresh_token_secret {
        tracing::error!("access and refresh token secrets must differ");
        std::process::exit(1);
    }

    let db_config = db_config_from_env();
    let manager = match DbManager::connect(&db_config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(e) = warden_db::run_migrations(manager.client()).await {
        tracing::error!(error = %e, "migrations failed");
        std::process::exit(1);
    }

    if let Err(e) = warden_db::seed_catalog(manager.client()).await {
        tracing::error!(error = %e, "catalog seeding failed");
        std::process::exit(1);
    }

    // TODO: mount the HTTP transport once the route layer lands; the
    // engine is exposed through warden_auth::{AuthService, AuthorizationGuard}.

    tracing::info!("WARDEN server stopped.");
}
