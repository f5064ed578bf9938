//! Port for the structured conversation record.
//!
//! `tracing` carries human-readable diagnostics; this port carries the
//! machine-readable history of a session (what was sent, what came back,
//! which replies were voiced) for adapters such as a JSONL file.

use serde_json::Value;

/// Kind of a recorded conversation event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Full message list sent to the completion endpoint
    ApiRequest,
    /// Assistant turn recorded in the transcript (reply or apology)
    AssistantReply,
    SpeechSynthesized,
    SpeechFailed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ApiRequest => "api_request",
            EventKind::AssistantReply => "assistant_reply",
            EventKind::SpeechSynthesized => "speech_synthesized",
            EventKind::SpeechFailed => "speech_failed",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded event with its JSON payload
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEvent {
    pub kind: EventKind,
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self { kind, payload }
    }
}

/// Sink for conversation events.
///
/// Recording never fails from the caller's point of view; adapters swallow
/// their own I/O errors.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Logger that drops every event
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
