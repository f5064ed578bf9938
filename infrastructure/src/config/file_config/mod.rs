//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Enumerated values are kept as strings so that a bad value produces a
//! warning and a fallback instead of refusing to start.

mod chat;
mod logging;
mod providers;
mod repl;
mod resources;
mod speech;

pub use chat::FileChatConfig;
pub use logging::FileLoggingConfig;
pub use providers::FileOpenAiConfig;
pub use repl::FileReplConfig;
pub use resources::{DEFAULT_EXTERNAL_DOC_FILE, DEFAULT_SYSTEM_PROMPT_FILE, FileResourcesConfig};
pub use speech::FileSpeechConfig;

use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model, completion mode and failure reply
    pub chat: FileChatConfig,
    /// System prompt and external document locations
    pub resources: FileResourcesConfig,
    /// OpenAI endpoint and credentials
    pub openai: FileOpenAiConfig,
    /// Speech defaults and playback
    pub speech: FileSpeechConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Conversation and diagnostic log files
    pub logging: FileLoggingConfig,
}

/// A problem found in an otherwise loadable configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Dotted key of the offending field, e.g. `speech.voice`
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl FileConfig {
    /// Validate the configuration, returning every issue found.
    ///
    /// Each issue has a working fallback, so callers warn and continue.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.chat.model.trim().is_empty() {
            issues.push(ConfigIssue {
                field: "chat.model".to_string(),
                message: "empty model name".to_string(),
            });
        }
        if let (_, Some(e)) = self.chat.parse_mode() {
            issues.push(ConfigIssue {
                field: "chat.mode".to_string(),
                message: format!("{e}, falling back to 'streaming'"),
            });
        }
        if let (_, Some(e)) = self.speech.parse_voice() {
            issues.push(ConfigIssue {
                field: "speech.voice".to_string(),
                message: format!("{e}, falling back to 'alloy'"),
            });
        }
        if let (_, Some(e)) = self.speech.parse_model() {
            issues.push(ConfigIssue {
                field: "speech.model".to_string(),
                message: format!("{e}, falling back to 'tts-1'"),
            });
        }
        if self.openai.timeout_seconds == Some(0) {
            issues.push(ConfigIssue {
                field: "openai.timeout_seconds".to_string(),
                message: "a zero timeout fails every request".to_string(),
            });
        }

        issues
    }
}
