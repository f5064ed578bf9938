//! Chat configuration from TOML (`[chat]` section)

use docchat_application::{CompletionMode, DEFAULT_APOLOGY};
use docchat_domain::Model;
use serde::{Deserialize, Serialize};

/// Raw chat configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// Completion model identifier
    pub model: String,
    /// "streaming" or "blocking"
    pub mode: String,
    /// Reply recorded when a completion fails
    pub apology: String,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            model: Model::default().as_str().to_string(),
            mode: CompletionMode::default().as_str().to_string(),
            apology: DEFAULT_APOLOGY.to_string(),
        }
    }
}

impl FileChatConfig {
    pub fn parse_model(&self) -> Model {
        Model::from_id(&self.model)
    }

    /// Parse the mode, falling back to streaming on unknown values
    pub fn parse_mode(&self) -> (CompletionMode, Option<String>) {
        match self.mode.parse() {
            Ok(mode) => (mode, None),
            Err(e) => (CompletionMode::default(), Some(e)),
        }
    }
}
