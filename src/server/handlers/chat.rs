use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::state::AppState;

pub const NOT_READY_ERROR: &str = "Database not initialized. Please run the ingestion step first.";
pub const NOT_READY_RESPONSE: &str =
    "⚠️ The placement database is not ready yet. Please contact the administrator.";
pub const FAILURE_RESPONSE: &str =
    "❌ Sorry, I encountered an error processing your request. Please try again.";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// Failures of `POST /api/chat`. Each carries its own body shape so that
/// clients can show `response` as-is when present.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Message cannot be empty")]
    EmptyMessage,
    #[error("Message is too long (max {0} characters)")]
    TooLong(usize),
    #[error("{}", NOT_READY_ERROR)]
    NotReady,
    #[error("{0}")]
    Failed(String),
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ChatError::InvalidBody(_) | ChatError::EmptyMessage | ChatError::TooLong(_) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ChatError::NotReady => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": message,
                    "response": NOT_READY_RESPONSE
                })),
            )
                .into_response(),
            ChatError::Failed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": message,
                    "response": FAILURE_RESPONSE,
                    "status": "error"
                })),
            )
                .into_response(),
        }
    }
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ChatError> {
    let Json(request) = payload.map_err(|e| ChatError::InvalidBody(e.body_text()))?;

    let message = request.message.trim();
    if message.is_empty() {
        return Err(ChatError::EmptyMessage);
    }
    let max = state.settings.max_input_length;
    if message.chars().count() > max {
        return Err(ChatError::TooLong(max));
    }

    let status = state.answers.store().status().await;
    if !status.is_ready() {
        tracing::warn!(
            collection = %status.collection_name,
            state = status.status.as_str(),
            "Chat request rejected: document store not ready"
        );
        return Err(ChatError::NotReady);
    }

    tracing::info!("Chat request ({} chars)", message.chars().count());
    match state.answers.answer(message).await {
        Ok(response) => Ok(Json(json!({
            "response": response,
            "status": "success"
        }))),
        Err(err) => {
            tracing::error!("Failed to answer chat request: {}", err);
            Err(ChatError::Failed(err.message()))
        }
    }
}
