//! CLI command definitions

use clap::{Parser, ValueEnum};
use docchat_application::CompletionMode;
use std::path::PathBuf;

/// How the reply is fetched from the completion endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Render chunks as they arrive
    Streaming,
    /// Wait for the whole reply
    Blocking,
}

impl From<ModeArg> for CompletionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Streaming => CompletionMode::Streaming,
            ModeArg::Blocking => CompletionMode::Blocking,
        }
    }
}

/// CLI arguments for docchat
#[derive(Parser, Debug)]
#[command(name = "docchat")]
#[command(author, version, about = "Chat with an LLM about a reference document")]
#[command(long_about = r#"
docchat sends your messages to an OpenAI-compatible chat completion API.
Every message is paired with the contents of a reference document, and a
system prompt is prepended to every request. Replies can be turned into
speech with /speak.

Configuration files are loaded from (in priority order):
1. DOCCHAT_* environment variables
2. --config <path>     Explicit config file
3. ./docchat.toml      Project-level config
4. ~/.config/docchat/config.toml   Global config

The API key is read from OPENAI_API_KEY (a .env file is honored).

Example:
  docchat
  docchat "What does section 3 of the handbook say about refunds?"
  docchat --doc notes.txt --mode blocking -m gpt-4o
"#)]
pub struct Cli {
    /// Send a single message, print the reply and exit
    pub message: Option<String>,

    /// Completion model
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Completion mode
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// System prompt file
    #[arg(long, value_name = "PATH")]
    pub system_prompt: Option<PathBuf>,

    /// External document file
    #[arg(long, value_name = "PATH")]
    pub doc: Option<PathBuf>,

    /// Fail when the system prompt or document file is missing
    #[arg(long)]
    pub strict: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Directory for daily-rotated log files
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Append a JSONL record of the conversation to this file
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,
}
