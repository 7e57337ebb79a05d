//! REST API server module
//!
//! Exposes the download endpoint, the optional status log and a few
//! system endpoints under `/api`.

use crate::{Config, Downloader, Result, StatusLog};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Downloads
/// - `POST /api/download` - Fetch a media URL and stream the produced file
///
/// ## Status Log
/// - `GET /api/status` - List recorded status checks
/// - `POST /api/status` - Record a status check
///
/// ## System
/// - `GET /api/` - Greeting
/// - `GET /api/health` - Health check
/// - `GET /api/openapi.json` - OpenAPI specification
pub fn create_router(state: AppState) -> Router {
    let server = state.config.server.clone();

    let router = Router::new()
        // System
        .route("/api/", get(routes::root))
        .route("/api/health", get(routes::health_check))
        .route("/api/openapi.json", get(routes::openapi_spec))
        // Status Log
        .route(
            "/api/status",
            get(routes::list_status_checks).post(routes::create_status_check),
        )
        // Downloads
        .route("/api/download", post(routes::download))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if server.cors_enabled {
        router.layer(build_cors_layer(&server.cors_origins))
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` anywhere in the list (or an empty list) allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Prepares the scratch directory, opens the status log, then serves until
/// SIGTERM/SIGINT (Ctrl+C elsewhere). In-flight responses are allowed to
/// finish before the status log is closed.
///
/// # Example
///
/// ```no_run
/// use media_dl::Config;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
///
/// // Blocks until shutdown
/// media_dl::api::start_api_server(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.bind_address;

    tracing::info!(
        address = %bind_address,
        scratch_dir = ?config.download.scratch_dir,
        timeout_secs = config.download.timeout.as_secs(),
        "Starting API server"
    );

    let downloader = Downloader::new(config.clone());
    downloader.prepare_scratch_dir().await?;

    let status_log = Arc::new(StatusLog::open(&config.persistence).await?);
    let app = create_router(AppState::new(downloader, status_log.clone(), config));

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "API server listening"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(crate::shutdown_signal())
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()));

    status_log.close().await;
    tracing::info!("API server stopped");
    served
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
