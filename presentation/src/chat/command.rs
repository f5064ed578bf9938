//! Slash command parsing for the chat REPL

use docchat_application::CompletionMode;
use docchat_domain::{SpeechModel, Voice};
use std::path::PathBuf;
use thiserror::Error;

/// A parsed REPL command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    History,
    /// Show (None) or switch the completion model
    Model(Option<String>),
    /// Show (None) or switch the completion mode
    Mode(Option<CompletionMode>),
    /// Synthesize speech; unset fields fall back to the last reply and
    /// the configured defaults
    Speak {
        index: Option<usize>,
        voice: Option<Voice>,
        model: Option<SpeechModel>,
    },
    Play(usize),
    Save { index: usize, path: PathBuf },
    Voices,
    Reset,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (type /help for available commands)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a message index, voice or speech model")]
    UnrecognizedArgument(String),

    #[error("{0}")]
    InvalidMode(String),
}

impl ReplCommand {
    /// Parse a line starting with `/`
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();

        match name {
            "/quit" | "/exit" | "/q" => Ok(Self::Quit),
            "/help" | "/h" | "/?" => Ok(Self::Help),
            "/history" | "/transcript" => Ok(Self::History),
            "/voices" => Ok(Self::Voices),
            "/reset" | "/clear" => Ok(Self::Reset),
            "/model" => Ok(Self::Model(args.first().map(|s| s.to_string()))),
            "/mode" => match args.first() {
                None => Ok(Self::Mode(None)),
                Some(mode) => mode
                    .parse()
                    .map(|m| Self::Mode(Some(m)))
                    .map_err(CommandError::InvalidMode),
            },
            "/speak" => Self::parse_speak(&args),
            "/play" => match args.as_slice() {
                [index] => index
                    .parse()
                    .map(Self::Play)
                    .map_err(|_| CommandError::Usage(PLAY_USAGE)),
                _ => Err(CommandError::Usage(PLAY_USAGE)),
            },
            "/save" => match args.as_slice() {
                [index, path] => {
                    let index = index.parse().map_err(|_| CommandError::Usage(SAVE_USAGE))?;
                    Ok(Self::Save {
                        index,
                        path: PathBuf::from(path),
                    })
                }
                _ => Err(CommandError::Usage(SAVE_USAGE)),
            },
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }

    /// Arguments may come in any order; each is classified by what it parses as.
    fn parse_speak(args: &[&str]) -> Result<Self, CommandError> {
        let mut index = None;
        let mut voice = None;
        let mut model = None;

        for arg in args {
            if index.is_none()
                && let Ok(i) = arg.parse::<usize>()
            {
                index = Some(i);
            } else if voice.is_none()
                && let Ok(v) = arg.parse::<Voice>()
            {
                voice = Some(v);
            } else if model.is_none()
                && let Ok(m) = arg.parse::<SpeechModel>()
            {
                model = Some(m);
            } else {
                return Err(CommandError::UnrecognizedArgument(arg.to_string()));
            }
        }

        Ok(Self::Speak {
            index,
            voice,
            model,
        })
    }
}

const PLAY_USAGE: &str = "/play <index>";
const SAVE_USAGE: &str = "/save <index> <path>";

/// Help text listing every command
pub const HELP: &str = "\
Commands:
  /help, /h, /?                   - Show this help
  /history                        - Show the transcript with message indices
  /model [name]                   - Show or switch the completion model
  /mode [streaming|blocking]      - Show or switch the completion mode
  /speak [index] [voice] [model]  - Turn a reply into speech (default: last reply)
  /play <index>                   - Play the audio of a reply
  /save <index> <path>            - Save the audio of a reply as mp3
  /voices                         - List voices and speech models
  /reset                          - Start a new conversation
  /quit, /exit, /q                - Exit chat";
