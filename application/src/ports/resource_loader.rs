//! Resource loader port
//!
//! Defines how text resources (system prompt, external document) are read.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading a text resource
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("File '{}' not found.", .0.display())]
    NotFound(PathBuf),

    #[error("Could not read '{}': {message}", .path.display())]
    Unreadable { path: PathBuf, message: String },
}

impl ResourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResourceError::NotFound(_))
    }
}

/// Port for loading text resources
pub trait ResourceLoaderPort: Send + Sync {
    /// Read the file at `path` as UTF-8, trimming surrounding whitespace
    fn load_text(&self, path: &Path) -> Result<String, ResourceError>;
}
