//! Speech gateway port
//!
//! Defines the interface for text-to-speech providers.

use crate::ports::completion_gateway::GatewayError;
use async_trait::async_trait;
use docchat_domain::{AudioClip, SpeechRequest};

/// Gateway for speech synthesis
#[async_trait]
pub trait SpeechGateway: Send + Sync {
    /// Check that the gateway can issue requests at all (e.g. has an API key).
    fn ensure_ready(&self) -> Result<(), GatewayError> {
        Ok(())
    }

    /// Synthesize `request.input` and return the encoded audio in memory
    async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioClip, GatewayError>;
}
