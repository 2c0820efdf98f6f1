use serde_json::{json, Value};

pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 5000;
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 4_000;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_CHROMA_URL: &str = "http://localhost:8000";
pub const DEFAULT_COLLECTION_NAME: &str = "placement_documents";
pub const DEFAULT_TOP_K: usize = 4;
pub const DEFAULT_EMBEDDING_URL: &str = "http://localhost:8080";
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

pub fn default_suggestions() -> Vec<String> {
    [
        "Tell me about the interview process of fidelity investments",
        "What companies visited for placements in Mechanical department?",
        "how many rounds of interview for citi bank?",
        "explain the interview process for comcast?",
        "What package does citi bank offers?",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// The configuration written for a fresh install. Secrets are left out on purpose.
pub fn generate_default_config() -> Value {
    json!({
        "server": {
            "host": DEFAULT_SERVER_HOST,
            "port": DEFAULT_SERVER_PORT,
        },
        "app": {
            "max_input_length": DEFAULT_MAX_INPUT_LENGTH,
            "suggestions": default_suggestions(),
        },
        "llm": {
            "provider": "gemini",
            "base_url": DEFAULT_GEMINI_BASE_URL,
            "model": DEFAULT_GEMINI_MODEL,
            "timeout_secs": DEFAULT_LLM_TIMEOUT_SECS,
        },
        "rag": {
            "chroma_url": DEFAULT_CHROMA_URL,
            "collection": DEFAULT_COLLECTION_NAME,
            "top_k": DEFAULT_TOP_K,
            "embedding_url": DEFAULT_EMBEDDING_URL,
            "embedding_model": DEFAULT_EMBEDDING_MODEL,
        },
    })
}
