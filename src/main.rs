use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheetbase_server::constants::MAX_UPLOAD_SIZE_BYTES;
use sheetbase_server::routes::{
    delete_table, health_check, list_tables, load_data, monthly_averages, save_data, upload_excel,
};
use sheetbase_server::{AppState, Config, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetbase_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sheetbase Server...");

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Dialect: {}, Server: {}",
        config.dialect.name(),
        config.server_address()
    );

    // Create database connection pool
    let store = Store::connect(&config).await?;

    // Configure CORS; "*" (the default) allows any origin
    let cors = if config.allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
            ])
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(
                config
                    .allowed_origins
                    .iter()
                    .map(|s| s.parse().unwrap())
                    .collect::<Vec<_>>(),
            )
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
            ])
            .allow_headers(Any)
    };

    // Create app state
    let state = AppState {
        store,
        config: config.clone(),
    };

    // Build router; unmatched paths fall through to the bundled front-end
    let app = Router::new()
        .route("/api/save-data", post(save_data))
        .route("/api/load-data", get(load_data))
        .route("/api/upload-excel", post(upload_excel))
        .route("/api/monthly-averages", get(monthly_averages))
        .route("/api/list-tables", get(list_tables))
        .route("/api/delete-table", delete(delete_table))
        .route("/api/health", get(health_check))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server_address().parse()?;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
