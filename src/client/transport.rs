//! HTTP round trips to the chatbot backend.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::suggestions::parse_suggestions;
use super::ClientError;

pub const UNREACHABLE_MESSAGE: &str =
    "❌ Cannot reach the server. Please make sure the backend is running and try again.";
pub const GENERIC_ERROR_MESSAGE: &str =
    "❌ Sorry, something went wrong while processing your request. Please try again.";

/// Outcome of one chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// 2xx with a string `response`.
    Answer(String),
    /// Any other response. `message` is the server's `error` text, if it sent one.
    Failed { status: u16, message: Option<String> },
    /// No response could be obtained.
    Unreachable,
}

impl ChatReply {
    /// Text of the bot turn that reports this outcome.
    pub fn bot_text(&self) -> String {
        match self {
            ChatReply::Answer(text) => text.clone(),
            ChatReply::Failed {
                message: Some(message),
                ..
            } => format!("❌ Error: {}", message),
            ChatReply::Failed { message: None, .. } => GENERIC_ERROR_MESSAGE.to_string(),
            ChatReply::Unreachable => UNREACHABLE_MESSAGE.to_string(),
        }
    }
}

/// Maps a `/api/chat` status and body to a [`ChatReply`].
///
/// Anything that is not a 2xx carrying a string `response` is a failure,
/// including success statuses with malformed bodies.
pub fn parse_chat_response(status: u16, body: &str) -> ChatReply {
    let payload = serde_json::from_str::<Value>(body).ok();
    let field = |name: &str| {
        payload
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    if (200..300).contains(&status) {
        if let Some(answer) = field("response") {
            return ChatReply::Answer(answer);
        }
    }

    ChatReply::Failed {
        status,
        message: field("error").filter(|m| !m.trim().is_empty()),
    }
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sends one message. Never fails; failures are encoded in the reply.
    async fn send(&self, message: &str) -> ChatReply;

    async fn suggestions(&self) -> Result<Vec<String>, ClientError>;
}

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send(&self, message: &str) -> ChatReply {
        let url = format!("{}/api/chat", self.base_url);
        let response = match self
            .client
            .post(&url)
            .json(&json!({ "message": message }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("Chat request to {} failed: {}", url, err);
                return ChatReply::Unreachable;
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!("Failed to read chat response body: {}", err);
                return ChatReply::Unreachable;
            }
        };

        let reply = parse_chat_response(status, &body);
        if !matches!(reply, ChatReply::Answer(_)) {
            tracing::warn!(status, "Chat request failed");
        }
        reply
    }

    async fn suggestions(&self) -> Result<Vec<String>, ClientError> {
        let url = format!("{}/api/suggestions", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        let payload: Value =
            serde_json::from_str(&body).map_err(|e| ClientError::Malformed(e.to_string()))?;
        Ok(parse_suggestions(&payload))
    }
}
