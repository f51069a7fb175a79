use std::sync::Arc;

use coauthor_ai::Orchestrator;

use crate::config::ServerConfig;
use crate::storage::ObjectStore;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable. The fan-out registry is constructed once in `main`
/// (or the test harness) before the router exists, so every handler that
/// broadcasts is guaranteed an initialized [`WsManager`].
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: coauthor_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Realtime notification fan-out (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// AI generation with ordered backend fallback.
    pub generator: Arc<Orchestrator>,
    /// Where uploaded images are written.
    pub object_store: Arc<dyn ObjectStore>,
}
