use anyhow::Context;
use axum::http::StatusCode;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod database;
mod directory;
mod error;
mod models;
mod revalidate;
mod routes;
mod service;
mod state;
mod store;

use auth::HeaderIdentityGateway;
use config::Config;
use revalidate::ViewCache;
use service::ProfileService;
use state::AppState;
use store::postgres::PgProfileStore;

async fn handle_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    let pool = database::create_database_connection(&config)
        .await
        .context("failed to connect to PostgreSQL")?;
    database::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let state = AppState {
        profiles: Arc::new(ProfileService::new(
            Arc::new(PgProfileStore::new(pool)),
            ViewCache::new(),
        )),
        identity: Arc::new(HeaderIdentityGateway::new(&config.identity_headers)),
    };

    // Allow requests from the frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = routes::api_router(state);

    // Serve the built frontend when one is configured
    app = match &config.static_dir {
        Some(dir) => {
            let serve_dir = ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html")));
            app.fallback_service(serve_dir)
        }
        None => app.fallback(handle_404),
    };

    let app = app.layer(cors).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "server running");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
