//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod completion_gateway;
pub mod conversation_logger;
pub mod reply_observer;
pub mod resource_loader;
pub mod speech_gateway;
