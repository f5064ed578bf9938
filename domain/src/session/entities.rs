//! Session domain entities

use crate::core::error::DomainError;
use crate::core::model::Model;
use crate::speech::AudioClip;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

/// A message in a conversation (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// One interactive chat session (Entity)
///
/// Holds the transcript in conversation order, the system prompt that is
/// prepended to every request, the model used for the next turn, and the
/// synthesized audio for assistant turns keyed by transcript index.
///
/// The transcript is append-only: there is no way to edit or remove a
/// message once pushed, so audio stored for an index never goes stale.
#[derive(Debug, Clone)]
pub struct Session {
    system_prompt: String,
    model: Model,
    messages: Vec<Message>,
    audio: BTreeMap<usize, AudioClip>,
}

impl Session {
    pub fn new(system_prompt: impl Into<String>, model: Model) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            model,
            messages: Vec::new(),
            audio: BTreeMap::new(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Switch the model used for subsequent turns
    pub fn set_model(&mut self, model: Model) {
        self.model = model;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn message(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    /// Append a message and return its transcript index
    pub fn push(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) -> usize {
        self.push(Message::user(content))
    }

    pub fn add_assistant_message(&mut self, content: impl Into<String>) -> usize {
        self.push(Message::assistant(content))
    }

    /// Index of the most recent assistant turn, if any
    pub fn last_assistant_index(&self) -> Option<usize> {
        self.messages
            .iter()
            .rposition(|m| m.role == Role::Assistant)
    }

    /// Content of the assistant turn at `index`
    pub fn assistant_text(&self, index: usize) -> Result<&str, DomainError> {
        let message = self
            .messages
            .get(index)
            .ok_or(DomainError::MessageNotFound(index))?;
        if message.role != Role::Assistant {
            return Err(DomainError::NotAssistantMessage {
                index,
                role: message.role.to_string(),
            });
        }
        Ok(&message.content)
    }

    /// Store synthesized audio for the assistant turn at `index`
    ///
    /// Replaces any clip previously stored for that index.
    pub fn store_audio(&mut self, index: usize, clip: AudioClip) -> Result<(), DomainError> {
        self.assistant_text(index)?;
        self.audio.insert(index, clip);
        Ok(())
    }

    pub fn audio(&self, index: usize) -> Option<&AudioClip> {
        self.audio.get(&index)
    }

    pub fn has_audio(&self, index: usize) -> bool {
        self.audio.contains_key(&index)
    }

    /// Number of assistant turns with synthesized audio
    pub fn audio_count(&self) -> usize {
        self.audio.len()
    }
}

/// Holder for the session of one interactive run
///
/// The slot is owned by whoever drives the interaction loop. Initialization
/// only creates a session when none exists, so calling it on every event
/// never resets the transcript, model, or audio.
#[derive(Debug, Default)]
pub struct SessionSlot {
    session: Option<Session>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the session if absent and return it
    pub fn initialize(&mut self, system_prompt: impl Into<String>, model: Model) -> &mut Session {
        self.session
            .get_or_insert_with(|| Session::new(system_prompt, model))
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    pub fn get(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Discard the current session, returning it
    pub fn reset(&mut self) -> Option<Session> {
        self.session.take()
    }
}
