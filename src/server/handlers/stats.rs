use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.answers.store().status().await;
    Json(json!({
        "total_chunks": status.total_chunks,
        "collection_name": status.collection_name,
        "status": status.status.as_str()
    }))
}
