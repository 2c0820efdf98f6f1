use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

/// Liveness plus the readiness of the document collection.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = state.answers.store().status().await;
    Json(json!({
        "status": "healthy",
        "database": database
    }))
}
