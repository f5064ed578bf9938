//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving every request, reply and speech event
    pub conversation_log: Option<String>,
    /// Directory for daily-rotated diagnostic logs
    pub log_dir: Option<String>,
}
