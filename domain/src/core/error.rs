//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("No message at index {0}")]
    MessageNotFound(usize),

    #[error("Message {index} is a {role} turn, not an assistant reply")]
    NotAssistantMessage { index: usize, role: String },

    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    #[error("Unknown speech model: {0}")]
    UnknownSpeechModel(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

impl DomainError {
    /// Check if this error came from parsing user-supplied input
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            DomainError::UnknownVoice(_)
                | DomainError::UnknownSpeechModel(_)
                | DomainError::UnknownRole(_)
                | DomainError::EmptyMessage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_assistant_display() {
        let error = DomainError::NotAssistantMessage {
            index: 2,
            role: "user".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Message 2 is a user turn, not an assistant reply"
        );
    }

    #[test]
    fn test_invalid_input_check() {
        assert!(DomainError::UnknownVoice("bob".to_string()).is_invalid_input());
        assert!(DomainError::EmptyMessage.is_invalid_input());
        assert!(!DomainError::MessageNotFound(3).is_invalid_input());
    }
}
