//! Resource configuration from TOML (`[resources]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SYSTEM_PROMPT_FILE: &str = "system_prompt.txt";
pub const DEFAULT_EXTERNAL_DOC_FILE: &str = "external_doc.txt";

/// Raw resource configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileResourcesConfig {
    /// Path of the system prompt text
    pub system_prompt: PathBuf,
    /// Path of the external document text
    pub external_doc: PathBuf,
    /// Treat a missing file as a fatal error instead of using empty text
    pub strict: bool,
}

impl Default for FileResourcesConfig {
    fn default() -> Self {
        Self {
            system_prompt: PathBuf::from(DEFAULT_SYSTEM_PROMPT_FILE),
            external_doc: PathBuf::from(DEFAULT_EXTERNAL_DOC_FILE),
            strict: false,
        }
    }
}
