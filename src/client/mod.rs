//! Terminal chat client for the placement chatbot.
//!
//! The client keeps all conversation state inside a single [`ChatSession`]
//! that is driven one event at a time by [`ClientRuntime`]. Network calls run
//! as spawned tasks that report back through the runtime's channel.
//!
//! [`ChatSession`]: session::ChatSession
//! [`ClientRuntime`]: runtime::ClientRuntime

use serde_json::Value;
use thiserror::Error;

pub mod message;
pub mod runtime;
pub mod session;
pub mod speech;
pub mod suggestions;
pub mod transport;
pub mod tui;
pub mod view;

/// Backend address the client talks to.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

pub const DEFAULT_GREETING: &str = "👋 Hello! I'm your placement assistant. Ask me about **companies**, **interview rounds** or **packages** from previous placement drives.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// The `client` section of the configuration.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// External speech-to-text command; empty means speech input is unavailable.
    pub speech_command: Vec<String>,
    pub greeting: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            speech_command: Vec::new(),
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

impl ClientSettings {
    pub fn from_config(config: &Value) -> Self {
        let defaults = Self::default();
        let section = config.get("client");

        let speech_command = section
            .and_then(|v| v.get("speech_command"))
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or(defaults.speech_command);

        let greeting = section
            .and_then(|v| v.get("greeting"))
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or(defaults.greeting);

        Self {
            speech_command,
            greeting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_settings_default_without_section() {
        let settings = ClientSettings::from_config(&json!({ "server": {} }));
        assert!(settings.speech_command.is_empty());
        assert_eq!(settings.greeting, DEFAULT_GREETING);
    }

    #[test]
    fn client_settings_read_speech_command() {
        let settings = ClientSettings::from_config(&json!({
            "client": {
                "speech_command": ["whisper-listen", "--once"],
                "greeting": "Hi there"
            }
        }));
        assert_eq!(settings.speech_command, vec!["whisper-listen", "--once"]);
        assert_eq!(settings.greeting, "Hi there");
    }
}
