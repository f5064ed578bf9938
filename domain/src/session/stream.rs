//! Streaming events for chat completion.
//!
//! [`StreamEvent`] bridges the infrastructure-level server-sent event stream
//! to the application layer so partial text can be rendered as it arrives.

/// An event in a streaming completion response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk from the model.
    Delta(String),
    /// The complete response text (signals stream end).
    Completed(String),
    /// An error that occurred during streaming (signals stream end).
    Error(String),
}
