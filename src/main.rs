use lighter_fiscal::ledger::ExplorerClient;
use lighter_fiscal::{api, config::Config, JobRegistry, LedgerSource};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = std::fs::create_dir_all(&config.reports_dir) {
        eprintln!(
            "Failed to create reports directory {}: {}",
            config.reports_dir, e
        );
        std::process::exit(1);
    }

    let source: Arc<dyn LedgerSource> = match ExplorerClient::new(
        config.ledger_api_url.clone(),
        config.request_timeout,
    ) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("Failed to build ledger client: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;
    let state = api::AppState {
        registry: JobRegistry::new(),
        source,
        config,
    };
    let app = api::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
