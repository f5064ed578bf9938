//! Prompt domain
//!
//! Assembly of the per-turn request from the system prompt, the transcript
//! and the external document.

mod template;

pub use template::{WRAPPER_TAGS, build_request, contains_wrapper_tags, format_user_message_with_doc};
