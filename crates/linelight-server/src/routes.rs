//! Request handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Serialize;
use serde_json::{Value, json};

use linelight_core::{CacheStats, Cancelled, HighlightRequest, HighlightResponse};

use crate::AppState;
use crate::error::ApiError;

/// `POST /highlight`
///
/// Highlighting is CPU-bound, so it runs on the blocking pool. On timeout the
/// task's cancellation flag is raised; it stops at the next check and caches
/// nothing.
pub async fn highlight(
    State(state): State<AppState>,
    payload: Result<Json<HighlightRequest>, JsonRejection>,
) -> Result<Json<Arc<HighlightResponse>>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected highlight request: {}", e);
        ApiError::BadRequest(e.body_text())
    })?;

    let highlighter = Arc::clone(&state.highlighter);
    let cancel = Arc::new(AtomicUsize::new(0));
    let task_cancel = Arc::clone(&cancel);
    let task = tokio::task::spawn_blocking(move || {
        highlighter.highlight_cancellable(&request, &task_cancel)
    });

    match tokio::time::timeout(state.timeout, task).await {
        Ok(Ok(Ok(response))) => Ok(Json(response)),
        Ok(Ok(Err(Cancelled))) => Err(ApiError::Timeout),
        Ok(Err(e)) => {
            tracing::error!("Highlight error: {}", e);
            Err(ApiError::Internal)
        }
        Err(_) => {
            cancel.store(1, Ordering::Relaxed);
            tracing::warn!("Highlight timed out after {:?}", state.timeout);
            Err(ApiError::Timeout)
        }
    }
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<String>,
    pub cache: CacheStats,
}

/// `GET /languages`
pub async fn languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: state.highlighter.languages(),
        cache: state.highlighter.cache_stats(),
    })
}
