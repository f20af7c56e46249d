//! HTTP API server for the avatar gateway

pub mod chat;
pub mod health;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::chat::ChatPipeline;
use crate::db::DbPool;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Per-request pipeline, constructed once at startup
    pub pipeline: Arc<ChatPipeline>,

    /// Database pool, used directly only by readiness checks
    pub db: DbPool,
}

/// Build the application router
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    // CORS layer for cross-origin requests from the avatar frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(chat::router(state.clone()))
        .merge(health::router())
        .merge(health::ready_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server until shutdown
///
/// # Errors
///
/// Returns error if server fails to bind or run
pub async fn serve(state: Arc<ApiState>, port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

    tracing::info!(port, "API server listening");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

    Ok(())
}
