//! Reply observer port
//!
//! Receives incremental reply output so the presentation layer can render a
//! completion while it is still in flight.

use docchat_domain::Model;

/// Callback for reply progress during one chat turn
pub trait ReplyObserver: Send + Sync {
    /// Called right before the request is sent
    fn on_request_start(&self, _model: &Model, _streaming: bool) {}

    /// Called for each text chunk as it arrives (streaming mode only)
    fn on_delta(&self, _chunk: &str) {}

    /// Called once the request has finished, successfully or not
    fn on_request_end(&self) {}

    /// Called when the request failed and the apology is used instead
    fn on_failure(&self, _error: &str) {}
}

/// No-op observer
pub struct NoReplyObserver;

impl ReplyObserver for NoReplyObserver {}
