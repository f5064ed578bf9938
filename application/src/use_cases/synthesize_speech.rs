//! Synthesize speech use case.
//!
//! Turns one assistant turn into audio on demand and stores the clip in the
//! session under the turn's transcript index.
//!
//! A gateway failure is logged and yields `Ok(None)` ("speech unavailable for
//! this request"); it never touches the transcript or any other stored clip.

use crate::ports::completion_gateway::GatewayError;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, EventKind, NoConversationLogger,
};
use crate::ports::speech_gateway::SpeechGateway;
use docchat_domain::{AudioClip, DomainError, Session, SpeechModel, SpeechRequest, Voice};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Errors that reject a speech request before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Input for [`SynthesizeSpeechUseCase`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechInput {
    /// Transcript index of the assistant turn to speak.
    pub index: usize,
    pub voice: Voice,
    pub model: SpeechModel,
}

impl SpeechInput {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            voice: Voice::default(),
            model: SpeechModel::default(),
        }
    }

    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.voice = voice;
        self
    }

    pub fn with_model(mut self, model: SpeechModel) -> Self {
        self.model = model;
        self
    }
}

/// Use case for synthesizing speech for an assistant turn.
pub struct SynthesizeSpeechUseCase {
    gateway: Arc<dyn SpeechGateway>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl SynthesizeSpeechUseCase {
    pub fn new(gateway: Arc<dyn SpeechGateway>) -> Self {
        Self {
            gateway,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Synthesize the assistant turn at `input.index`.
    ///
    /// Returns `Ok(Some(clip))` on success (the clip is also stored in the
    /// session), `Ok(None)` when the speech endpoint failed, and `Err` when
    /// the index does not name an assistant turn.
    pub async fn execute(
        &self,
        session: &mut Session,
        input: SpeechInput,
    ) -> Result<Option<AudioClip>, SpeechError> {
        let text = session.assistant_text(input.index)?.to_string();
        self.gateway.ensure_ready()?;
        let request = SpeechRequest::new(input.model, input.voice, text);

        let clip = match self.gateway.synthesize(&request).await {
            Ok(clip) => clip,
            Err(e) => {
                error!("Error generating speech for message {}: {}", input.index, e);
                self.conversation_logger.log(ConversationEvent::new(
                    EventKind::SpeechFailed,
                    serde_json::json!({
                        "index": input.index,
                        "voice": input.voice.as_str(),
                        "model": input.model.as_str(),
                        "error": e.to_string(),
                    }),
                ));
                return Ok(None);
            }
        };

        info!(
            "Synthesized {} bytes of {} audio for message {} ({}, {})",
            clip.len(),
            clip.format(),
            input.index,
            input.voice,
            input.model
        );
        self.conversation_logger.log(ConversationEvent::new(
            EventKind::SpeechSynthesized,
            serde_json::json!({
                "index": input.index,
                "voice": input.voice.as_str(),
                "model": input.model.as_str(),
                "bytes": clip.len(),
            }),
        ));

        session.store_audio(input.index, clip.clone())?;
        Ok(Some(clip))
    }
}
