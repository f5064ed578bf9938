//! Application layer for docchat
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ChatParams, CompletionMode, DEFAULT_APOLOGY};
pub use ports::{
    completion_gateway::{CompletionGateway, CompletionRequest, GatewayError, StreamHandle},
    conversation_logger::{ConversationEvent, ConversationLogger, EventKind, NoConversationLogger},
    reply_observer::{NoReplyObserver, ReplyObserver},
    resource_loader::{ResourceError, ResourceLoaderPort},
    speech_gateway::SpeechGateway,
};
pub use use_cases::open_session::{
    OpenSessionError, OpenSessionInput, OpenSessionUseCase, ResourceIssue, ResourceKind,
    SessionResources,
};
pub use use_cases::send_message::{SendMessageError, SendMessageUseCase, TurnOutcome};
pub use use_cases::synthesize_speech::{SpeechError, SpeechInput, SynthesizeSpeechUseCase};
