//! Application-level configuration.
//!
//! - [`ChatParams`]: completion mode and failure reply for a chat turn

pub mod chat_params;

pub use chat_params::{ChatParams, CompletionMode, DEFAULT_APOLOGY};
