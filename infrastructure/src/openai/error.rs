//! Error types for the OpenAI adapter

use docchat_application::GatewayError;
use thiserror::Error;

/// Result type alias for OpenAI operations
pub type Result<T> = std::result::Result<T, OpenAiError>;

/// Errors that can occur when talking to the OpenAI HTTP API
#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("API key not found. Please set {0} in the environment or .env file.")]
    MissingApiKey(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse stream chunk: {error}\nRaw chunk: {raw}")]
    ChunkParse { error: String, raw: String },

    #[error("Response contained no choices")]
    NoChoices,
}

impl From<OpenAiError> for GatewayError {
    fn from(e: OpenAiError) -> Self {
        match e {
            OpenAiError::MissingApiKey(env) => GatewayError::MissingApiKey(env),
            OpenAiError::Http(e) if e.is_timeout() => GatewayError::Timeout,
            OpenAiError::Http(e) if e.is_connect() => GatewayError::ConnectionError(e.to_string()),
            OpenAiError::Http(e) => GatewayError::RequestFailed(e.to_string()),
            OpenAiError::Api { status, message } => GatewayError::ApiError { status, message },
            OpenAiError::Serialization(e) => GatewayError::InvalidResponse(e.to_string()),
            e @ (OpenAiError::ChunkParse { .. } | OpenAiError::NoChoices) => {
                GatewayError::InvalidResponse(e.to_string())
            }
            OpenAiError::ClientBuild(msg) => GatewayError::ConnectionError(msg),
        }
    }
}
