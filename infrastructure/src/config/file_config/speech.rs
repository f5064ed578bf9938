//! Speech configuration from TOML (`[speech]` section)

use docchat_domain::{DomainError, SpeechModel, Voice};
use serde::{Deserialize, Serialize};

/// Raw speech configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSpeechConfig {
    /// Default speech model ("tts-1" or "tts-1-hd")
    pub model: String,
    /// Default voice
    pub voice: String,
    /// Command used by `/play`, e.g. "mpv --no-video" (the file path is appended)
    pub player: Option<String>,
}

impl Default for FileSpeechConfig {
    fn default() -> Self {
        Self {
            model: SpeechModel::default().as_str().to_string(),
            voice: Voice::default().as_str().to_string(),
            player: None,
        }
    }
}

impl FileSpeechConfig {
    pub fn parse_model(&self) -> (SpeechModel, Option<DomainError>) {
        match self.model.parse() {
            Ok(model) => (model, None),
            Err(e) => (SpeechModel::default(), Some(e)),
        }
    }

    pub fn parse_voice(&self) -> (Voice, Option<DomainError>) {
        match self.voice.parse() {
            Ok(voice) => (voice, None),
            Err(e) => (Voice::default(), Some(e)),
        }
    }
}
