//! Provider configuration from TOML (`[openai]` section)

use crate::openai::OpenAiSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI API provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended; use the env var instead).
    pub api_key: Option<String>,
    /// Base URL for the API (can point at any compatible server).
    pub base_url: String,
    /// Whole-request timeout in seconds; unset keeps the transport default.
    pub timeout_seconds: Option<u64>,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            timeout_seconds: None,
        }
    }
}

impl FileOpenAiConfig {
    /// Build gateway settings, reading the key from the environment if needed
    pub fn to_settings(&self) -> OpenAiSettings {
        OpenAiSettings {
            api_key: self.api_key.clone(),
            api_key_env: self.api_key_env.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout_seconds.map(Duration::from_secs),
        }
        .resolve_api_key_from_env()
    }
}
