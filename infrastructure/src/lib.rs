//! Infrastructure layer for docchat
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod openai;
pub mod resources;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigLoader, FileChatConfig, FileConfig, FileLoggingConfig, FileOpenAiConfig,
    FileReplConfig, FileResourcesConfig, FileSpeechConfig,
};
pub use logging::JsonlConversationLogger;
pub use openai::{OpenAiError, OpenAiGateway, OpenAiSettings};
pub use resources::LocalResourceLoader;
