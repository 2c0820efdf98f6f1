//! DocumentStore trait: read-only interface over the vector database.
//!
//! Indexing happens elsewhere; the chatbot only reads. The production
//! implementation is `ChromaStore` in the `chroma` module.

use async_trait::async_trait;
use serde::Serialize;

use crate::core::errors::ApiError;

/// Readiness of the document collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreState {
    Ready,
    NotInitialized,
    Error,
}

impl StoreState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreState::Ready => "ready",
            StoreState::NotInitialized => "not_initialized",
            StoreState::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    pub status: StoreState,
    pub total_chunks: usize,
    pub collection_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StoreStatus {
    pub fn ready(collection_name: &str, total_chunks: usize) -> Self {
        Self {
            status: StoreState::Ready,
            total_chunks,
            collection_name: collection_name.to_string(),
            message: None,
        }
    }

    pub fn not_initialized(collection_name: &str) -> Self {
        Self {
            status: StoreState::NotInitialized,
            total_chunks: 0,
            collection_name: collection_name.to_string(),
            message: None,
        }
    }

    pub fn error(collection_name: &str, message: impl Into<String>) -> Self {
        Self {
            status: StoreState::Error,
            total_chunks: 0,
            collection_name: collection_name.to_string(),
            message: Some(message.into()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == StoreState::Ready
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn collection_name(&self) -> &str;

    /// Current readiness and size of the collection. Never fails; problems
    /// are reported through `StoreState::Error`.
    async fn status(&self) -> StoreStatus;

    /// Text of the `limit` documents closest to `query_embedding`, best first.
    async fn query(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<String>, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_serializes_like_the_health_payload() {
        let status = StoreStatus::ready("placement_documents", 42);
        assert_eq!(
            serde_json::to_value(&status).expect("serialize"),
            json!({
                "status": "ready",
                "total_chunks": 42,
                "collection_name": "placement_documents"
            })
        );
    }

    #[test]
    fn error_status_carries_message() {
        let status = StoreStatus::error("docs", "connection refused");
        assert!(!status.is_ready());
        assert_eq!(status.status.as_str(), "error");
        assert_eq!(status.message.as_deref(), Some("connection refused"));
    }
}
