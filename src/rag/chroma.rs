//! Chroma-backed document store.
//!
//! Talks to a Chroma server over its REST API. The collection is looked
//! up by name on first use and its id cached; a missing collection is
//! reported as `not_initialized` rather than failing startup.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use super::store::{DocumentStore, StoreStatus};
use crate::core::errors::ApiError;

pub struct ChromaStore {
    base_url: String,
    collection_name: String,
    client: Client,
    collection_id: RwLock<Option<String>>,
}

#[derive(Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
}

impl ChromaStore {
    pub fn new(base_url: &str, collection_name: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::internal)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            collection_name: collection_name.to_string(),
            client,
            collection_id: RwLock::new(None),
        })
    }

    /// Resolves the collection id, `Ok(None)` when the collection does not exist.
    async fn resolve_collection_id(&self) -> Result<Option<String>, ApiError> {
        if let Some(id) = self.collection_id.read().await.as_ref() {
            return Ok(Some(id.clone()));
        }

        let url = format!(
            "{}/api/v1/collections/{}",
            self.base_url,
            urlencoding::encode(&self.collection_name)
        );
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            if is_missing_collection(status, &text) {
                return Ok(None);
            }
            return Err(ApiError::Upstream(format!(
                "Chroma error {}: {}",
                status.as_u16(),
                text
            )));
        }

        let info: CollectionInfo = res.json().await.map_err(ApiError::upstream)?;
        tracing::info!(
            "Resolved Chroma collection '{}' -> {}",
            self.collection_name,
            info.id
        );
        *self.collection_id.write().await = Some(info.id.clone());
        Ok(Some(info.id))
    }

    async fn count(&self, collection_id: &str) -> Result<usize, ApiError> {
        let url = format!("{}/api/v1/collections/{}/count", self.base_url, collection_id);
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ApiError::upstream)?;
        if !res.status().is_success() {
            return Err(ApiError::Upstream(format!(
                "Chroma count failed: {}",
                res.status()
            )));
        }
        let value: Value = res.json().await.map_err(ApiError::upstream)?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| ApiError::Upstream(format!("Unexpected count payload: {}", value)))
    }

    async fn forget_collection(&self) {
        *self.collection_id.write().await = None;
    }
}

/// Chroma answers unknown collections with 404 on recent versions and with a
/// 500 "does not exist" body on older ones.
fn is_missing_collection(status: StatusCode, body: &str) -> bool {
    status == StatusCode::NOT_FOUND || body.contains("does not exist")
}

#[async_trait]
impl DocumentStore for ChromaStore {
    fn collection_name(&self) -> &str {
        &self.collection_name
    }

    async fn status(&self) -> StoreStatus {
        let collection_id = match self.resolve_collection_id().await {
            Ok(Some(id)) => id,
            Ok(None) => return StoreStatus::not_initialized(&self.collection_name),
            Err(err) => {
                tracing::warn!("Chroma status check failed: {}", err);
                return StoreStatus::error(&self.collection_name, err.message());
            }
        };

        match self.count(&collection_id).await {
            Ok(total) => StoreStatus::ready(&self.collection_name, total),
            Err(err) => {
                tracing::warn!("Chroma count failed: {}", err);
                // The collection may have been dropped and recreated by ingestion.
                self.forget_collection().await;
                StoreStatus::error(&self.collection_name, err.message())
            }
        }
    }

    async fn query(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<String>, ApiError> {
        let collection_id = self.resolve_collection_id().await?.ok_or_else(|| {
            ApiError::ServiceUnavailable(format!(
                "Collection '{}' does not exist",
                self.collection_name
            ))
        })?;

        let url = format!("{}/api/v1/collections/{}/query", self.base_url, collection_id);
        let body = json!({
            "query_embeddings": [query_embedding],
            "n_results": limit,
            "include": ["documents"],
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            if is_missing_collection(status, &text) {
                self.forget_collection().await;
            }
            return Err(ApiError::Upstream(format!(
                "Chroma query failed {}: {}",
                status.as_u16(),
                text
            )));
        }

        let payload: QueryResponse = res.json().await.map_err(ApiError::upstream)?;
        let documents = payload
            .documents
            .and_then(|mut per_query| {
                if per_query.is_empty() {
                    None
                } else {
                    Some(per_query.swap_remove(0))
                }
            })
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        tracing::info!("Retrieved {} relevant chunks", documents.len());
        Ok(documents)
    }
}
