//! Open session use case
//!
//! Loads the two text resources a session needs: the system prompt and the
//! external document.
//!
//! A missing file degrades to an empty string and is reported back as a
//! [`ResourceIssue`] so the caller can show it to the user. With
//! [`OpenSessionInput::strict`] set, a missing file is a hard error instead.

use crate::ports::resource_loader::{ResourceError, ResourceLoaderPort};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while opening a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpenSessionError {
    /// A resource file is missing and strict mode is enabled.
    #[error("{kind} file '{}' not found.", .path.display())]
    MissingResource { kind: ResourceKind, path: PathBuf },

    /// A resource exists but could not be read.
    #[error("{kind}: {source}")]
    Resource {
        kind: ResourceKind,
        #[source]
        source: ResourceError,
    },
}

/// Which resource a message refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    SystemPrompt,
    ExternalDocument,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::SystemPrompt => f.write_str("System prompt"),
            ResourceKind::ExternalDocument => f.write_str("External document"),
        }
    }
}

/// A user-visible problem found while loading resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIssue {
    pub kind: ResourceKind,
    pub path: PathBuf,
}

impl std::fmt::Display for ResourceIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} file '{}' not found.", self.kind, self.path.display())
    }
}

/// Input for [`OpenSessionUseCase`].
#[derive(Debug, Clone)]
pub struct OpenSessionInput {
    pub system_prompt_path: PathBuf,
    pub document_path: PathBuf,
    /// Treat missing files as fatal.
    pub strict: bool,
}

impl OpenSessionInput {
    pub fn new(system_prompt_path: impl Into<PathBuf>, document_path: impl Into<PathBuf>) -> Self {
        Self {
            system_prompt_path: system_prompt_path.into(),
            document_path: document_path.into(),
            strict: false,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Loaded resources for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionResources {
    pub system_prompt: String,
    pub document: String,
    /// Missing files that were replaced with empty text.
    pub issues: Vec<ResourceIssue>,
}

/// Use case for loading the session resources.
pub struct OpenSessionUseCase {
    loader: Arc<dyn ResourceLoaderPort>,
}

impl OpenSessionUseCase {
    pub fn new(loader: Arc<dyn ResourceLoaderPort>) -> Self {
        Self { loader }
    }

    pub fn execute(&self, input: &OpenSessionInput) -> Result<SessionResources, OpenSessionError> {
        let mut issues = Vec::new();

        let system_prompt = self.load(
            ResourceKind::SystemPrompt,
            &input.system_prompt_path,
            input.strict,
            &mut issues,
        )?;
        let document = self.load(
            ResourceKind::ExternalDocument,
            &input.document_path,
            input.strict,
            &mut issues,
        )?;

        info!(
            "Loaded session resources: system prompt {} chars, document {} chars",
            system_prompt.chars().count(),
            document.chars().count()
        );

        Ok(SessionResources {
            system_prompt,
            document,
            issues,
        })
    }

    fn load(
        &self,
        kind: ResourceKind,
        path: &std::path::Path,
        strict: bool,
        issues: &mut Vec<ResourceIssue>,
    ) -> Result<String, OpenSessionError> {
        match self.loader.load_text(path) {
            Ok(text) => Ok(text),
            Err(e) if e.is_not_found() => {
                if strict {
                    return Err(OpenSessionError::MissingResource {
                        kind,
                        path: path.to_path_buf(),
                    });
                }
                warn!("{} file '{}' not found, using empty text", kind, path.display());
                issues.push(ResourceIssue {
                    kind,
                    path: path.to_path_buf(),
                });
                Ok(String::new())
            }
            Err(source) => Err(OpenSessionError::Resource { kind, source }),
        }
    }
}
