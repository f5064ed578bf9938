//! OpenAI adapter
//!
//! Implements the completion and speech gateway ports over the OpenAI HTTP
//! API (or any compatible server reachable at `base_url`).

pub mod error;
pub mod gateway;
pub mod sse;
pub mod types;

pub use error::{OpenAiError, Result};
pub use gateway::{OpenAiGateway, OpenAiSettings};
