use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn suggestions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "suggestions": state.settings.suggestions,
        "status": "success"
    }))
}
