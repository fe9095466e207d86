pub mod download;
pub mod health;
pub mod reports;

use crate::config::Config;
use crate::jobs::JobRegistry;
use crate::ledger::LedgerSource;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub registry: JobRegistry,
    pub source: Arc<dyn LedgerSource>,
    pub config: Config,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/generate-report", post(reports::generate_report))
        .route("/api/report-status/:id", get(reports::report_status))
        .route(
            "/api/download/:id/:file_type",
            get(download::download_artifact),
        )
        .layer(cors)
        .with_state(state)
}
