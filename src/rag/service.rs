use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::embedding::Embedder;
use super::prompt::{build_context, build_prompt};
use super::store::DocumentStore;
use crate::core::config::defaults::{
    DEFAULT_CHROMA_URL, DEFAULT_COLLECTION_NAME, DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_URL,
    DEFAULT_TOP_K,
};
use crate::core::errors::ApiError;
use crate::llm::{GenerateRequest, LlmProvider, LlmSettings};

/// The `rag` section of the configuration.
#[derive(Debug, Clone)]
pub struct RagSettings {
    pub chroma_url: String,
    pub collection: String,
    pub top_k: usize,
    pub embedding_url: String,
    pub embedding_model: String,
    pub timeout: Duration,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            chroma_url: DEFAULT_CHROMA_URL.to_string(),
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            top_k: DEFAULT_TOP_K,
            embedding_url: DEFAULT_EMBEDDING_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RagSettings {
    pub fn from_config(config: &Value) -> Self {
        let defaults = Self::default();
        let section = config.get("rag");
        let string_field = |key: &str| {
            section
                .and_then(|v| v.get(key))
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            chroma_url: string_field("chroma_url").unwrap_or(defaults.chroma_url),
            collection: string_field("collection").unwrap_or(defaults.collection),
            top_k: section
                .and_then(|v| v.get("top_k"))
                .and_then(|v| v.as_u64())
                .map(|v| v as usize)
                .unwrap_or(defaults.top_k),
            embedding_url: string_field("embedding_url").unwrap_or(defaults.embedding_url),
            embedding_model: string_field("embedding_model").unwrap_or(defaults.embedding_model),
            timeout: section
                .and_then(|v| v.get("timeout_secs"))
                .and_then(|v| v.as_u64())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// Retrieval-augmented answering: embed, retrieve, prompt, generate.
#[derive(Clone)]
pub struct AnswerService {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LlmProvider>,
    llm_settings: LlmSettings,
    top_k: usize,
}

impl AnswerService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LlmProvider>,
        llm_settings: LlmSettings,
        top_k: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            llm,
            llm_settings,
            top_k,
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    pub async fn answer(&self, question: &str) -> Result<String, ApiError> {
        let embedding = self.embedder.embed(question).await?;
        let documents = self.store.query(&embedding, self.top_k).await?;
        if documents.is_empty() {
            tracing::warn!("No relevant information found; answering without context");
        }

        let context = build_context(&documents);
        let prompt = build_prompt(&context, question);
        let request = GenerateRequest::new(prompt).with_settings(&self.llm_settings);

        let answer = self.llm.generate(request).await?;
        tracing::debug!(
            provider = self.llm.name(),
            chars = answer.len(),
            "Generated answer"
        );
        Ok(answer)
    }
}
