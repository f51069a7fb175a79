use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use coauthor_ai::{GeminiProvider, Orchestrator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coauthor_api::config::ServerConfig;
use coauthor_api::router::build_app_router;
use coauthor_api::state::AppState;
use coauthor_api::storage::LocalObjectStore;
use coauthor_api::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coauthor_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = coauthor_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    coauthor_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    coauthor_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());

    // --- Heartbeat ---
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));

    // --- AI generation ---
    let attempt_timeout = Duration::from_secs(config.ai.attempt_timeout_secs);
    let generator = match &config.ai.api_key {
        Some(api_key) => {
            let client = reqwest::Client::builder()
                .timeout(attempt_timeout)
                .build()
                .expect("Failed to build HTTP client");
            let provider =
                GeminiProvider::new(client, config.ai.base_url.clone(), api_key.clone());
            tracing::info!(base_url = %config.ai.base_url, "AI generation enabled");
            Orchestrator::new(Arc::new(provider), attempt_timeout)
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set, AI generation disabled");
            Orchestrator::unconfigured()
        }
    };

    // --- Object storage ---
    let object_store = LocalObjectStore::new(&config.upload.dir, &config.upload.public_base_url);
    tracing::info!(dir = %config.upload.dir, "Local object store ready");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        generator: Arc::new(generator),
        object_store: Arc::new(object_store),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    heartbeat_handle.abort();
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
