//! Presentation layer for docchat
//!
//! This crate contains CLI definitions, the interactive chat REPL, console
//! formatting, reply progress rendering and audio export/playback.

pub mod audio;
pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use audio::{AudioError, play_clip, save_clip};
pub use chat::{ChatRepl, ReplCommand};
pub use cli::commands::{Cli, ModeArg};
pub use config::ReplConfig;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::ProgressReporter;
