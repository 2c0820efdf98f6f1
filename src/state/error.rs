use thiserror::Error;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] anyhow::Error),

    #[error("GOOGLE_API_KEY is not set (configure llm.api_key in secrets.yaml or the environment)")]
    MissingApiKey,

    #[error("Failed to initialize LLM provider: {0}")]
    Llm(#[source] anyhow::Error),

    #[error("Failed to initialize document store: {0}")]
    Rag(#[source] anyhow::Error),
}
