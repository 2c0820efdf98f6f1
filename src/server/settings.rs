use serde_json::Value;

use crate::core::config::defaults::{
    default_suggestions, DEFAULT_MAX_INPUT_LENGTH, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
};

/// The `server` and `app` sections of the configuration.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_input_length: usize,
    pub suggestions: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            cors_allowed_origins: default_local_origins(),
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
            suggestions: default_suggestions(),
        }
    }
}

impl ServerSettings {
    pub fn from_config(config: &Value) -> Self {
        let defaults = Self::default();
        let server = config.get("server");
        let app = config.get("app");

        let cors_allowed_origins = server
            .and_then(|s| s.get("cors_allowed_origins"))
            .map(string_list)
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.cors_allowed_origins);

        let suggestions = app
            .and_then(|a| a.get("suggestions"))
            .map(string_list)
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.suggestions);

        Self {
            host: server
                .and_then(|s| s.get("host"))
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .unwrap_or(defaults.host),
            port: server
                .and_then(|s| s.get("port"))
                .and_then(|v| v.as_u64())
                .and_then(|v| u16::try_from(v).ok())
                .filter(|v| *v != 0)
                .unwrap_or(defaults.port),
            cors_allowed_origins,
            max_input_length: app
                .and_then(|a| a.get("max_input_length"))
                .and_then(|v| v.as_u64())
                .map(|v| v as usize)
                .unwrap_or(defaults.max_input_length),
            suggestions,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|item| item.as_str())
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| item.to_string())
                .collect()
        })
        .unwrap_or_default()
}

pub fn default_local_origins() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://127.0.0.1".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_config_uses_defaults() {
        let settings = ServerSettings::from_config(&json!({}));
        assert_eq!(settings.bind_addr(), "0.0.0.0:5000");
        assert_eq!(settings.suggestions.len(), 5);
        assert!(settings
            .cors_allowed_origins
            .contains(&"http://localhost:3000".to_string()));
    }

    #[test]
    fn reads_configured_values() {
        let settings = ServerSettings::from_config(&json!({
            "server": {
                "host": "127.0.0.1",
                "port": 8081,
                "cors_allowed_origins": ["https://placements.example.edu", " "]
            },
            "app": { "max_input_length": 200, "suggestions": ["Which companies hire ECE?"] }
        }));
        assert_eq!(settings.bind_addr(), "127.0.0.1:8081");
        assert_eq!(
            settings.cors_allowed_origins,
            vec!["https://placements.example.edu".to_string()]
        );
        assert_eq!(settings.max_input_length, 200);
        assert_eq!(settings.suggestions, vec!["Which companies hire ECE?".to_string()]);
    }

    #[test]
    fn empty_suggestion_list_falls_back_to_defaults() {
        let settings = ServerSettings::from_config(&json!({ "app": { "suggestions": [] } }));
        assert_eq!(settings.suggestions, default_suggestions());
    }
}
