//! Presentation-layer configuration
//!
//! Settings that only affect how the REPL looks and behaves. The binary
//! builds this from the `[repl]` and `[speech]` sections of the config file.

use docchat_domain::{SpeechModel, Voice};
use std::path::PathBuf;

/// REPL-related configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplConfig {
    /// Show a spinner while a blocking request is in flight
    pub show_progress: bool,
    /// Path to history file (`~/` is expanded)
    pub history_file: Option<String>,
    /// Voice used by `/speak` when none is given
    pub voice: Voice,
    /// Speech model used by `/speak` when none is given
    pub speech_model: SpeechModel,
    /// Command used by `/play`; the audio file path is appended
    pub player: Option<String>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
            voice: Voice::default(),
            speech_model: SpeechModel::default(),
            player: None,
        }
    }
}

impl ReplConfig {
    /// Resolve the readline history location
    ///
    /// Falls back to `<data dir>/docchat/history.txt`.
    pub fn history_path(&self) -> Option<PathBuf> {
        match self.history_file.as_deref() {
            Some(path) => Some(expand_home(path)),
            None => dirs::data_dir().map(|p| p.join("docchat").join("history.txt")),
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
