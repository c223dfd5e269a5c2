//! # Linelight Server
//!
//! HTTP front end for the highlighter.
//!
//! | Method | Path         | Body                                    |
//! |--------|--------------|-----------------------------------------|
//! | POST   | `/highlight` | `{"code", "language"?, "filename"?}`    |
//! | GET    | `/health`    | -                                       |
//! | GET    | `/languages` | -                                       |
//!
//! The server only translates between JSON and the core types. Malformed
//! bodies become 400s; anything that goes wrong inside a highlight call
//! becomes a generic 500, and a highlight that overruns the timeout is
//! cancelled and reported as a 503.

pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use linelight_core::Highlighter;
use linelight_core::config::ServerConfig;

pub use error::{ApiError, ServerError};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub highlighter: Arc<Highlighter>,
    pub timeout: Duration,
}

impl AppState {
    pub fn new(highlighter: Arc<Highlighter>, timeout: Duration) -> Self {
        Self {
            highlighter,
            timeout,
        }
    }
}

/// Builds the router.
pub fn router(state: AppState, cors: bool) -> Router {
    let router = Router::new()
        .route("/highlight", post(routes::highlight))
        .route("/health", get(routes::health))
        .route("/languages", get(routes::languages))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Binds to `config.bind_address()` and serves until Ctrl-C.
pub async fn serve(
    config: &ServerConfig,
    highlighter: Arc<Highlighter>,
) -> Result<(), ServerError> {
    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    let state = AppState::new(
        highlighter,
        Duration::from_millis(config.request_timeout_ms),
    );
    let app = router(state, config.cors);

    tracing::info!("Highlight service listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Highlight service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler we keep serving until killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
