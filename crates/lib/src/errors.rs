use thiserror::Error;

/// Custom error types for the AI provider layer.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to the AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize the AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("Failed to parse the AI response as JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("API key is missing")]
    MissingApiKey,
}
