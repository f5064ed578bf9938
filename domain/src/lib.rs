//! Domain layer for docchat
//!
//! This crate contains the core entities and pure logic of a document-grounded
//! chat session. It has no dependencies on infrastructure or presentation
//! concerns.
//!
//! # Core Concepts
//!
//! - **Transcript**: the ordered, append-only list of role-tagged messages
//! - **System prompt**: instruction text prepended to every request
//! - **External document**: reference text embedded with the latest user turn
//! - **Audio**: synthesized speech stored per assistant turn

pub mod core;
pub mod prompt;
pub mod reply;
pub mod session;
pub mod speech;
pub mod util;

// Re-export commonly used types
pub use core::{error::DomainError, model::Model};
pub use prompt::{build_request, contains_wrapper_tags, format_user_message_with_doc};
pub use reply::ReplyEnvelope;
pub use session::{
    entities::{Message, Role, Session, SessionSlot},
    stream::StreamEvent,
};
pub use speech::{AudioClip, SpeechModel, SpeechRequest, Voice};
