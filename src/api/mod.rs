//! REST API and WebSocket server
//!
//! This module exposes the registry over HTTP and streams live snapshot
//! updates to WebSocket observers. It is a thin shell: every operation maps
//! onto a registry call, and errors surface with machine-readable kinds.
//!
//! ## Architecture
//!
//! - **Axum** web framework with Tower middleware
//! - **Registry** behind shared state for all monitor operations
//! - **WebSocket** for real-time snapshot streaming
//!
//! ## Endpoints
//!
//! - `GET    /api/health` - Health check
//! - `GET    /api/monitors` - List all monitors
//! - `POST   /api/monitors` - Create a monitor
//! - `GET    /api/monitors/{id}` - Monitor snapshot
//! - `PATCH  /api/monitors/{id}` - Change the probe interval
//! - `DELETE /api/monitors/{id}` - Delete a monitor
//! - `GET    /api/monitors/{id}/history` - Probe outcome history
//! - `POST   /api/monitors/{id}/start` - Start probing
//! - `POST   /api/monitors/{id}/stop` - Stop probing
//! - `WS     /ws` - Real-time snapshot streaming

pub mod error;
pub mod routes;
pub mod state;
pub mod websocket;

pub use error::{ApiError, ApiResult};
pub use state::ApiState;

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{
    Router,
    routing::{get, post},
};
use tracing::info;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:3000")
    pub bind_addr: SocketAddr,

    /// Enable CORS for browser clients
    pub enable_cors: bool,

    /// Directory of static UI assets, served at the root when it exists
    pub static_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            enable_cors: true,
            static_dir: Some(PathBuf::from("public")),
        }
    }
}

/// Spawn the API server.
///
/// This starts an Axum HTTP server in a background task.
/// Returns the server's local address.
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    info!("starting API server on {}", config.bind_addr);

    let mut app = Router::new()
        .route("/api/health", get(routes::health::health_check))
        .route(
            "/api/monitors",
            get(routes::monitors::list_monitors).post(routes::monitors::create_monitor),
        )
        .route(
            "/api/monitors/:id",
            get(routes::monitors::get_monitor)
                .patch(routes::monitors::update_monitor)
                .delete(routes::monitors::delete_monitor),
        )
        .route(
            "/api/monitors/:id/history",
            get(routes::monitors::get_history),
        )
        .route(
            "/api/monitors/:id/start",
            post(routes::monitors::start_monitor),
        )
        .route(
            "/api/monitors/:id/stop",
            post(routes::monitors::stop_monitor),
        )
        .route("/ws", get(websocket::websocket_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Serve the browser UI if its assets are present
    if let Some(dir) = &config.static_dir {
        use tower_http::services::ServeDir;

        if dir.exists() {
            info!("serving static assets from {}", dir.display());
            app = app.nest_service("/", ServeDir::new(dir));
        } else {
            info!("static asset directory {} not found", dir.display());
        }
    }

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    // Bind and serve
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;

    info!("API server listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(addr)
}
