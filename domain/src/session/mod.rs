//! Chat session domain.
//!
//! - [`entities::Session`]: transcript, model choice and audio for one run
//! - [`entities::SessionSlot`]: initialize-once holder owned by the loop
//! - [`entities::Message`]: a single role-tagged message
//! - [`stream::StreamEvent`]: incremental completion events

pub mod entities;
pub mod stream;
