//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: chat-completion model identifiers
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
