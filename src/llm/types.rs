use std::time::Duration;

use serde_json::Value;

use crate::core::config::defaults::{
    DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, DEFAULT_LLM_TIMEOUT_SECS,
};

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
            max_output_tokens: None,
        }
    }

    pub fn with_settings(mut self, settings: &LlmSettings) -> Self {
        self.temperature = settings.temperature.or(self.temperature);
        self.max_output_tokens = settings.max_output_tokens.or(self.max_output_tokens);
        self
    }
}

/// The `llm` section of the configuration.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            temperature: None,
            max_output_tokens: None,
        }
    }
}

impl LlmSettings {
    /// Reads the `llm` section, falling back to `GOOGLE_API_KEY` for the key.
    pub fn from_config(config: &Value) -> Self {
        let defaults = Self::default();
        let section = config.get("llm");
        let string_field = |key: &str| {
            section
                .and_then(|v| v.get(key))
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let api_key = string_field("api_key").or_else(|| {
            std::env::var("GOOGLE_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        });

        Self {
            base_url: string_field("base_url").unwrap_or(defaults.base_url),
            model: string_field("model").unwrap_or(defaults.model),
            api_key,
            timeout: section
                .and_then(|v| v.get("timeout_secs"))
                .and_then(|v| v.as_u64())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            temperature: section
                .and_then(|v| v.get("temperature"))
                .and_then(|v| v.as_f64()),
            max_output_tokens: section
                .and_then(|v| v.get("max_output_tokens"))
                .and_then(|v| v.as_u64())
                .map(|v| v as u32),
        }
    }
}
