//! Example questions shown while the conversation is empty.

use serde_json::Value;

use super::transport::ChatBackend;

/// Example questions, applied once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SuggestionSet {
    items: Vec<String>,
    loaded: bool,
}

impl SuggestionSet {
    /// Stores the first loaded list. Later calls are ignored and return `false`.
    pub fn apply(&mut self, items: Vec<String>) -> bool {
        if self.loaded {
            return false;
        }
        self.items = items;
        self.loaded = true;
        true
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Reads `suggestions` from a payload. Missing or non-array fields give an
/// empty list; non-string and blank items are skipped.
pub fn parse_suggestions(payload: &Value) -> Vec<String> {
    payload
        .get("suggestions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Fetches suggestions. Failures are logged and yield an empty list.
pub async fn load_suggestions(backend: &dyn ChatBackend) -> Vec<String> {
    match backend.suggestions().await {
        Ok(items) => {
            tracing::debug!("Loaded {} suggestions", items.len());
            items
        }
        Err(err) => {
            tracing::warn!("Failed to load suggestions: {}", err);
            Vec::new()
        }
    }
}
