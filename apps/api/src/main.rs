mod applications;
mod config;
mod db;
mod errors;
mod feedback;
mod greenhouse;
mod ingest;
mod jobs;
mod models;
mod resumes;
mod routes;
mod state;
mod store;
mod users;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::ingest::client::HttpListingClient;
use crate::ingest::providers::ProviderEndpoints;
use crate::ingest::scheduler::{spawn_ingest_scheduler, SCHEDULE_PERIOD};
use crate::ingest::Ingestor;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{JobBoardStore, PgStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobboard v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store: Arc<dyn JobBoardStore> = Arc::new(PgStore::new(db));

    // Listing providers
    let client = HttpListingClient::new(Duration::from_secs(config.http_timeout_secs))?;
    let endpoints = ProviderEndpoints {
        remoteok_url: config.remoteok_url.clone(),
        remotive_url: config.remotive_url.clone(),
        greenhouse_base_url: config.greenhouse_base_url.clone(),
    };
    let ingestor = Arc::new(Ingestor::new(store.clone(), Arc::new(client), endpoints));
    info!("Ingestor initialized (timeout: {}s)", config.http_timeout_secs);

    if config.scheduler_enabled {
        spawn_ingest_scheduler(ingestor.clone(), SCHEDULE_PERIOD);
    } else {
        info!("Ingestion scheduler disabled; use /api/v1/jobs/fetch to run ingestion");
    }

    let state = AppState {
        store,
        ingestor,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
