use std::env;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use placement_chatbot::core::config::AppPaths;
use placement_chatbot::core::logging;
use placement_chatbot::server;
use placement_chatbot::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths);

    let state = AppState::initialize(paths)
        .await
        .context("Failed to initialize placement chatbot")?;

    let database = state.answers.store().status().await;
    if database.is_ready() {
        tracing::info!(
            "Database ready: {} chunks in '{}'",
            database.total_chunks,
            database.collection_name
        );
    } else {
        tracing::warn!(
            "Database status for '{}': {}{}",
            database.collection_name,
            database.status.as_str(),
            database
                .message
                .as_deref()
                .map(|m| format!(" ({})", m))
                .unwrap_or_default()
        );
    }

    let llm = state.answers.llm();
    match llm.health_check().await {
        Ok(true) => tracing::info!("LLM provider '{}' reachable", llm.name()),
        Ok(false) => tracing::warn!("LLM provider '{}' did not accept the model check", llm.name()),
        Err(e) => tracing::warn!("LLM provider '{}' check failed: {}", llm.name(), e),
    }

    let mut settings = state.settings.clone();
    if let Some(port) = env::var("PORT").ok().and_then(|val| val.parse::<u16>().ok()) {
        settings.port = port;
    }
    let bind_addr = settings.bind_addr();

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Placement chatbot listening on http://{}", addr);

    let app: Router = server::router::router(state.clone());
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
