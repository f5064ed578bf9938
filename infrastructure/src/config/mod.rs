//! Configuration file loading for docchat
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `DOCCHAT_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./docchat.toml` or `./.docchat.toml`
//! 4. Global: `$XDG_CONFIG_HOME/docchat/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, DEFAULT_EXTERNAL_DOC_FILE, DEFAULT_SYSTEM_PROMPT_FILE, FileChatConfig, FileConfig,
    FileLoggingConfig, FileOpenAiConfig, FileReplConfig, FileResourcesConfig, FileSpeechConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
