//! Reply domain: classification of completion text.

pub mod envelope;

pub use envelope::ReplyEnvelope;
