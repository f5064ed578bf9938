//! Completion gateway port
//!
//! Defines the interface for talking to a chat-completion provider.

use async_trait::async_trait;
use docchat_domain::{Message, Model, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("API key not found. Please set {0} in the environment or .env file.")]
    MissingApiKey(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Stream closed")]
    StreamClosed,
}

/// A fully assembled chat-completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: Model,
    pub messages: Vec<Message>,
}

impl CompletionRequest {
    pub fn new(model: Model, messages: Vec<Message>) -> Self {
        Self { model, messages }
    }
}

/// Handle for receiving streaming events from a completion.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`; the producer side is owned by the
/// adapter task reading the provider's event stream.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event, `None` once the producer is gone
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    /// Consume the stream, handing each delta to `on_delta`, and return the
    /// accumulated text.
    pub async fn accumulate<F>(mut self, mut on_delta: F) -> Result<String, GatewayError>
    where
        F: FnMut(&str),
    {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => {
                    on_delta(&chunk);
                    full_text.push_str(&chunk);
                }
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        on_delta(&text);
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => {
                    return Err(GatewayError::RequestFailed(e));
                }
            }
        }
        // Producer dropped without a terminal event
        if full_text.is_empty() {
            return Err(GatewayError::StreamClosed);
        }
        Ok(full_text)
    }
}

/// Gateway for chat completions
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Check that the gateway can issue requests at all (e.g. has an API key).
    ///
    /// Called before the user turn is recorded, so a failure here leaves the
    /// session untouched.
    fn ensure_ready(&self) -> Result<(), GatewayError> {
        Ok(())
    }

    /// Send the request and wait for the complete reply text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError>;

    /// Send the request and receive the reply incrementally.
    ///
    /// Default implementation calls `complete()` and wraps the result in a
    /// single `Completed` event.
    async fn complete_streaming(
        &self,
        request: &CompletionRequest,
    ) -> Result<StreamHandle, GatewayError> {
        let result = self.complete(request).await?;
        let (tx, rx) = mpsc::channel(1);
        let _ = tx.send(StreamEvent::Completed(result)).await;
        Ok(StreamHandle::new(rx))
    }
}
