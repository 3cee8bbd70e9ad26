//! libapi - REST API for a personal bibliographic catalog
//!
//! Serves the catalog over HTTP, or runs an admin command (`create-user`).

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libapi::cli::{Command, CreateUserArgs};
use libapi::config::Config;
use libapi::db::Database;
use libapi::services::{AuthConfig, AuthService};
use libapi::{AppState, build_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "libapi=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let command = Command::from_args()?;
    let config = Arc::new(Config::from_env()?);
    tracing::info!("Configuration loaded");

    let db = Database::connect(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to open catalog database")?;
    db.migrate().await.context("Failed to migrate catalog database")?;

    let identity_db = if config.identity_database_url == config.database_url {
        db.clone()
    } else {
        let identity_db =
            Database::connect(&config.identity_database_url, config.database_max_connections)
                .await
                .context("Failed to open identity database")?;
        identity_db
            .migrate()
            .await
            .context("Failed to migrate identity database")?;
        identity_db
    };
    tracing::info!("Database connected");

    let auth = AuthService::new(identity_db.clone(), AuthConfig::from_config(&config)?);

    match command {
        Command::CreateUser(args) => create_user(&auth, args).await,
        Command::Serve => serve(AppState { config, db, identity_db, auth }).await,
    }
}

async fn create_user(auth: &AuthService, args: CreateUserArgs) -> anyhow::Result<()> {
    let user_id = auth
        .create_user(&args.email, &args.name, &args.password, args.roles)
        .await?;
    tracing::info!(user_id = %user_id, email = %args.email, "User saved");
    Ok(())
}

async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
