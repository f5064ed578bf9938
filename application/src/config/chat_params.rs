//! Chat parameters: per-turn behavior of the use cases.
//!
//! [`ChatParams`] groups the settings that shape a chat turn and a speech
//! request. These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};

/// Reply shown and recorded when a completion fails
pub const DEFAULT_APOLOGY: &str = "Sorry, I couldn't process that.";

/// How the completion endpoint is called
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionMode {
    /// Incremental delivery of partial text
    #[default]
    Streaming,
    /// One request, one complete reply
    Blocking,
}

impl CompletionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionMode::Streaming => "streaming",
            CompletionMode::Blocking => "blocking",
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, CompletionMode::Streaming)
    }
}

impl std::fmt::Display for CompletionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CompletionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "streaming" | "stream" => Ok(CompletionMode::Streaming),
            "blocking" | "block" | "batch" => Ok(CompletionMode::Blocking),
            other => Err(format!(
                "unknown completion mode '{other}' (expected 'streaming' or 'blocking')"
            )),
        }
    }
}

/// Per-turn chat parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatParams {
    /// Streaming or blocking completion.
    pub mode: CompletionMode,
    /// Text recorded as the assistant turn when a completion fails.
    pub apology: String,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            mode: CompletionMode::default(),
            apology: DEFAULT_APOLOGY.to_string(),
        }
    }
}

impl ChatParams {
    pub fn with_mode(mut self, mode: CompletionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_apology(mut self, apology: impl Into<String>) -> Self {
        self.apology = apology.into();
        self
    }
}
