//! Chat endpoint: one message in, one spoken reply out

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::Error;
use crate::chat::ChatOutcome;

/// Build the chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new().route("/chat", post(handle_chat)).with_state(state)
}

/// Inbound chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message; required and non-empty
    #[serde(default)]
    pub message: Option<String>,
}

/// Successful chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub outcome: ChatOutcome,
}

/// Handle one chat message
///
/// This is the single failure boundary for the request: any error from the
/// pipeline is logged here once and mapped onto an HTTP response.
async fn handle_chat(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ChatError> {
    let message = request.message.unwrap_or_default();

    let outcome = state.pipeline.handle(&message).await.map_err(ChatError)?;

    Ok(Json(ChatResponse {
        status: "ok",
        outcome,
    }))
}

/// Wrapper mapping pipeline errors onto HTTP responses
#[derive(Debug)]
struct ChatError(Error);

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code) = match &self.0 {
            Error::Input(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "invalid_configuration"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "upstream_failed"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "chat request failed");
        } else {
            tracing::debug!(error = %self.0, "rejected chat request");
        }

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody {
                    code,
                    message: self.0.to_string(),
                },
            }),
        )
            .into_response()
    }
}
