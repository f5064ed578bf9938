//! Use cases
//!
//! Application-level operations that orchestrate domain logic. Each one is
//! invoked once per inbound event by the interaction loop.

pub mod open_session;
pub mod send_message;
pub mod synthesize_speech;
