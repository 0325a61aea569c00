use std::path::Path;
use std::sync::Arc;

use crate::model::{DbConnection, ModelManager, Store};
use crate::utils::signal::shutdown_signal;
use crate::{error::AppResult, web::AppState};
use axum::Router;
use tokio::net::TcpListener;

pub mod config;
pub use config::{Config, ConfigError, ConfigResult, EngineConfig};

pub mod auth;
pub mod engine;
pub mod error;
pub mod model;
pub mod utils;
pub mod web;

static APPLICATION_NAME: &str = "lessonflow";

/// Connects to PostgreSQL, applies `./migrations` and builds the router.
pub async fn build_server() -> AppResult<(AppState, Router)> {
    let use_local = cfg!(debug_assertions);
    let config = Config::get_or_init(use_local).await;

    let db = DbConnection::connect(config.app().database_uri(), config.app().max_connections())?;
    db.migrate(Path::new("./migrations")).await?;

    let mm = ModelManager::new(db);
    Ok(build_server_with_store(
        Arc::new(mm),
        config.app().jwt(),
        config.engine().clone(),
        config.app().docs(),
    ))
}

/// Builds the router on top of any [`Store`], no configuration file needed.
pub fn build_server_with_store(
    store: Arc<dyn Store>,
    jwt_secret: &str,
    engine: EngineConfig,
    docs: bool,
) -> (AppState, Router) {
    let state = AppState::new(store, jwt_secret, engine);
    let app = web::routes::build_app(state.clone(), docs);
    (state, app)
}

#[tracing::instrument]
pub async fn setup_workers() -> AppResult<()> {
    let (state, app) = build_server().await?;
    let config = Config::get_or_init(false).await;
    let listener = TcpListener::bind(config.host().bindto()).await?;

    tracing::info!("axum is starting at: {}", config.host().bindto());
    let axum_handle = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.shutdown().clone()));

    axum_handle.await?;
    Ok(())
}

fn setup_trace() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    // load .env file for RUST_LOG etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    tracing::debug!("tracing initialized.");
}

#[tracing::instrument]
pub async fn run() -> AppResult<()> {
    setup_trace();
    setup_workers().await?;
    Ok(())
}
