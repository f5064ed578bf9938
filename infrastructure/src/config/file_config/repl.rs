//! `[repl]` section: interactive session appearance

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Spinner while waiting for a blocking reply
    pub show_progress: bool,
    /// Readline history location; `~/` is expanded by the REPL
    pub history_file: Option<String>,
    /// `false` disables ANSI colors in transcript output
    pub color: bool,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
            color: true,
        }
    }
}
