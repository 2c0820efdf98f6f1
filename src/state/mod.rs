use std::sync::Arc;

use crate::core::config::{AppPaths, ConfigService};
use crate::llm::{GeminiProvider, LlmSettings};
use crate::rag::{AnswerService, ChromaStore, HttpEmbedder, RagSettings};
use crate::server::ServerSettings;

pub mod error;

use error::InitializationError;

/// Application state shared across all routes.
///
/// Contains references to:
/// - Server settings (bind address, CORS, suggestions)
/// - The answer pipeline (document store, embedder, LLM provider)
#[derive(Clone)]
pub struct AppState {
    pub settings: ServerSettings,
    pub answers: AnswerService,
}

impl AppState {
    /// Initializes the application state.
    ///
    /// This process includes:
    /// 1. Setting up paths and writing a default config on first run
    /// 2. Loading and validating configuration
    /// 3. Building the Gemini provider (requires an API key)
    /// 4. Connecting the Chroma store and embedding client
    ///
    /// The document collection is not required to exist yet; its absence is
    /// reported through `/api/health`.
    pub async fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths);

        match config.ensure_default_config() {
            Ok(true) => tracing::info!(
                "Wrote default configuration to {}",
                config.config_write_path().display()
            ),
            Ok(false) => {}
            Err(e) => tracing::warn!("Failed to write default config: {}", e),
        }

        let raw = config
            .load_config()
            .map_err(|e| InitializationError::Config(e.into()))?;
        tracing::debug!("Effective config: {}", config.redact_sensitive_values(&raw));

        let settings = ServerSettings::from_config(&raw);
        let llm_settings = LlmSettings::from_config(&raw);
        let rag_settings = RagSettings::from_config(&raw);

        let api_key = llm_settings
            .api_key
            .clone()
            .ok_or(InitializationError::MissingApiKey)?;
        let llm = Arc::new(
            GeminiProvider::new(&llm_settings, api_key)
                .map_err(|e| InitializationError::Llm(e.into()))?,
        );

        let store = Arc::new(
            ChromaStore::new(
                &rag_settings.chroma_url,
                &rag_settings.collection,
                rag_settings.timeout,
            )
            .map_err(|e| InitializationError::Rag(e.into()))?,
        );
        let embedder = Arc::new(
            HttpEmbedder::new(
                &rag_settings.embedding_url,
                &rag_settings.embedding_model,
                rag_settings.timeout,
            )
            .map_err(|e| InitializationError::Rag(e.into()))?,
        );

        let answers = AnswerService::new(store, embedder, llm, llm_settings, rag_settings.top_k);

        Ok(Arc::new(AppState {
            settings,
            answers,
        }))
    }
}
