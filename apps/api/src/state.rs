use std::sync::Arc;

use crate::config::Config;
use crate::ingest::Ingestor;
use crate::store::JobBoardStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobBoardStore>,
    pub ingestor: Arc<Ingestor>,
    pub config: Config,
}
