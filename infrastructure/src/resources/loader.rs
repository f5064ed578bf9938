//! Local file system resource loader
//!
//! [`LocalResourceLoader`] implements [`ResourceLoaderPort`] by reading
//! UTF-8 text files. Relative paths are resolved against an optional base
//! directory (the working directory by default).
//!
//! # Example
//!
//! ```ignore
//! use docchat_infrastructure::LocalResourceLoader;
//! use docchat_application::ResourceLoaderPort;
//! use std::path::Path;
//!
//! let loader = LocalResourceLoader::new();
//! let prompt = loader.load_text(Path::new("system_prompt.txt"))?;
//! ```

use docchat_application::{ResourceError, ResourceLoaderPort};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resource loader that reads from the local file system.
#[derive(Debug, Clone, Default)]
pub struct LocalResourceLoader {
    base_dir: Option<PathBuf>,
}

impl LocalResourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `dir` instead of the working directory.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ResourceLoaderPort for LocalResourceLoader {
    fn load_text(&self, path: &Path) -> Result<String, ResourceError> {
        let resolved = self.resolve(path);
        match std::fs::read_to_string(&resolved) {
            Ok(content) => {
                debug!("Read {} bytes from {}", content.len(), resolved.display());
                Ok(content.trim().to_string())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ResourceError::NotFound(resolved)),
            Err(e) => Err(ResourceError::Unreadable {
                path: resolved,
                message: e.to_string(),
            }),
        }
    }
}
