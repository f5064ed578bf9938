//! Request assembly for document-grounded chat
//!
//! Every request is `[system] + prior turns + latest user turn`, where only
//! the latest user turn is wrapped together with the external document.

use crate::session::entities::{Message, Role};

/// Tags that delimit the document and the user text inside the wrapped turn
pub const WRAPPER_TAGS: [&str; 4] = ["<content>", "</content>", "<user>", "</user>"];

/// Embed the external document alongside the user's message.
///
/// Neither input is escaped; see [`contains_wrapper_tags`] for detecting
/// inputs that would make the wrapped turn ambiguous.
pub fn format_user_message_with_doc(document: &str, user_message: &str) -> String {
    format!("<content>\n{document}\n</content>\n<user>\n{user_message}\n</user>")
}

/// Whether `text` contains any literal wrapper tag.
pub fn contains_wrapper_tags(text: &str) -> bool {
    WRAPPER_TAGS.iter().any(|tag| text.contains(tag))
}

/// Build the outbound message list for one turn.
///
/// The system prompt is always the first and only system entry. Historical
/// turns are copied verbatim; if the transcript ends with a user turn, that
/// turn alone is rewritten with [`format_user_message_with_doc`].
pub fn build_request(system_prompt: &str, transcript: &[Message], document: &str) -> Vec<Message> {
    let mut request = Vec::with_capacity(transcript.len() + 1);
    request.push(Message::system(system_prompt));

    match transcript.split_last() {
        Some((latest, history)) if latest.role == Role::User => {
            request.extend(history.iter().cloned());
            request.push(Message::user(format_user_message_with_doc(
                document,
                &latest.content,
            )));
        }
        _ => request.extend(transcript.iter().cloned()),
    }

    request
}
