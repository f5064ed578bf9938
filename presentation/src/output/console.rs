//! Console rendering of transcript turns

use colored::Colorize;
use docchat_application::ResourceIssue;
use docchat_domain::{Message, Role, Session, SpeechModel, Voice};

/// Marker appended to turns that have synthesized audio
pub const AUDIO_MARKER: &str = "🔊";

/// Formats chat output for the terminal
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Force colors off (or back to terminal detection)
    pub fn set_color_enabled(enabled: bool) {
        if enabled {
            colored::control::unset_override();
        } else {
            colored::control::set_override(false);
        }
    }

    /// Colored label for a role
    pub fn role_label(role: Role) -> String {
        match role {
            Role::User => "you".green().bold().to_string(),
            Role::Assistant => "assistant".cyan().bold().to_string(),
            Role::System => "system".dimmed().to_string(),
        }
    }

    /// Heading printed before a streamed reply
    pub fn reply_heading(index: Option<usize>) -> String {
        match index {
            Some(index) => format!("{} {}", format!("[{index}]").dimmed(), Self::role_label(Role::Assistant)),
            None => Self::role_label(Role::Assistant),
        }
    }

    /// Format one transcript turn
    pub fn format_turn(index: usize, message: &Message, has_audio: bool) -> String {
        let audio = if has_audio {
            format!(" {AUDIO_MARKER}")
        } else {
            String::new()
        };
        format!(
            "{} {}{}\n{}",
            format!("[{index}]").dimmed(),
            Self::role_label(message.role),
            audio,
            Self::indent(&message.content, "  ")
        )
    }

    /// Format the full transcript with indices and audio markers
    pub fn format_transcript(session: &Session) -> String {
        if session.is_empty() {
            return "(no messages yet)".dimmed().to_string();
        }

        session
            .messages()
            .iter()
            .enumerate()
            .map(|(index, message)| Self::format_turn(index, message, session.has_audio(index)))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Warning line for a resource that could not be loaded
    pub fn format_resource_issue(issue: &ResourceIssue) -> String {
        format!(
            "{} {} file '{}' not found; continuing without it.",
            "warning:".yellow().bold(),
            issue.kind,
            issue.path.display()
        )
    }

    /// List of voices and speech models for `/voices`
    pub fn format_voices(default_voice: Voice, default_model: SpeechModel) -> String {
        let mark = |selected: bool| if selected { " (default)" } else { "" };

        let mut output = format!("{}\n", "Voices:".cyan().bold());
        for voice in Voice::ALL {
            output.push_str(&format!("  - {}{}\n", voice, mark(voice == default_voice)));
        }
        output.push_str(&format!("{}\n", "Speech models:".cyan().bold()));
        for model in SpeechModel::ALL {
            output.push_str(&format!("  - {}{}\n", model, mark(model == default_model)));
        }
        output
    }

    pub fn error(message: impl std::fmt::Display) -> String {
        format!("{} {}", "error:".red().bold(), message)
    }

    pub fn notice(message: impl std::fmt::Display) -> String {
        format!("{} {}", "->".cyan(), message)
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
