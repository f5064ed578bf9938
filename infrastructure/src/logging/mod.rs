//! Structured conversation logging.
//!
//! Provides [`JsonlConversationLogger`], the file-backed implementation of
//! the [`ConversationLogger`](docchat_application::ConversationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlConversationLogger;
