//! REPL (Read-Eval-Print Loop) for interactive chat

use super::command::{HELP, ReplCommand};
use crate::audio::{AudioError, play_clip, save_clip};
use crate::config::ReplConfig;
use crate::output::console::{AUDIO_MARKER, ConsoleFormatter};
use crate::progress::reporter::ProgressReporter;
use colored::Colorize;
use docchat_application::{
    OpenSessionInput, OpenSessionUseCase, SendMessageError, SendMessageUseCase, SessionResources,
    SpeechInput, SynthesizeSpeechUseCase, TurnOutcome,
};
use docchat_domain::{AudioClip, Model, Session, SessionSlot, SpeechModel, Voice};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use tracing::{debug, warn};

/// Interactive chat REPL
///
/// Owns the session for the lifetime of the process. The session is created
/// lazily on the first message and survives every later turn until `/reset`.
pub struct ChatRepl {
    slot: SessionSlot,
    resources: SessionResources,
    reload: Option<(OpenSessionUseCase, OpenSessionInput)>,
    model: Model,
    send: SendMessageUseCase,
    speech: SynthesizeSpeechUseCase,
    config: ReplConfig,
}

impl ChatRepl {
    pub fn new(
        resources: SessionResources,
        model: Model,
        send: SendMessageUseCase,
        speech: SynthesizeSpeechUseCase,
    ) -> Self {
        Self {
            slot: SessionSlot::new(),
            resources,
            reload: None,
            model,
            send,
            speech,
            config: ReplConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Reload the system prompt and document from disk on `/reset`.
    pub fn with_resource_reload(mut self, use_case: OpenSessionUseCase, input: OpenSessionInput) -> Self {
        self.reload = Some((use_case, input));
        self
    }

    /// The live session, if a message has been sent
    pub fn session(&self) -> Option<&Session> {
        self.slot.get()
    }

    /// Send one message and render the reply.
    pub async fn ask(&mut self, message: &str) -> Result<TurnOutcome, SendMessageError> {
        let reporter = if self.config.show_progress {
            ProgressReporter::new()
        } else {
            ProgressReporter::without_spinner()
        };

        let session = self
            .slot
            .initialize(self.resources.system_prompt.clone(), self.model.clone());
        let outcome = self
            .send
            .execute(session, &self.resources.document, message, &reporter)
            .await?;

        if !outcome.streamed {
            println!(
                "{}\n{}",
                ConsoleFormatter::reply_heading(Some(outcome.assistant_index)),
                outcome.reply
            );
        }
        Ok(outcome)
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = self.config.history_path();
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    // Only an empty line is skipped; blank text is a message
                    if line.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line.as_str());

                    let command = line.trim();
                    if command.starts_with('/') {
                        if self.handle_command(command).await {
                            break;
                        }
                        continue;
                    }

                    println!();
                    if let Err(e) = self.ask(&line).await {
                        eprintln!("{}", ConsoleFormatter::error(e));
                    }
                    println!();
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path
            && let Err(e) = rl.save_history(path)
        {
            warn!("Could not save history to {}: {}", path.display(), e);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│               docchat - Chat Mode           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Model: {}", self.model);
        println!("Mode:  {}", self.send.params().mode);
        println!(
            "Document: {} chars, system prompt: {} chars",
            self.resources.document.chars().count(),
            self.resources.system_prompt.chars().count()
        );
        for issue in &self.resources.issues {
            println!("{}", ConsoleFormatter::format_resource_issue(issue));
        }
        println!();
        println!("Type a message, or /help for commands.");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&mut self, line: &str) -> bool {
        let command = match ReplCommand::parse(line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", ConsoleFormatter::error(e));
                return false;
            }
        };
        debug!("REPL command: {:?}", command);

        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => println!("\n{HELP}\n"),
            ReplCommand::History => match self.slot.get() {
                Some(session) => println!("\n{}\n", ConsoleFormatter::format_transcript(session)),
                None => println!("{}", "(no messages yet)".dimmed()),
            },
            ReplCommand::Model(None) => {
                println!("Current model: {}", self.model.to_string().bold());
                println!(
                    "Known models: {}",
                    Model::known_models()
                        .iter()
                        .map(|m| m.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            ReplCommand::Model(Some(name)) => {
                let model = Model::from_id(&name);
                if model.is_custom() {
                    println!(
                        "{}",
                        ConsoleFormatter::notice(format!("'{}' is not a known model; using it as given", model))
                    );
                }
                if let Some(session) = self.slot.get_mut() {
                    session.set_model(model.clone());
                }
                println!("{}", ConsoleFormatter::notice(format!("Model set to {}", model)));
                self.model = model;
            }
            ReplCommand::Mode(None) => {
                println!("Current mode: {}", self.send.params().mode.as_str().bold());
            }
            ReplCommand::Mode(Some(mode)) => {
                self.send.set_mode(mode);
                println!("{}", ConsoleFormatter::notice(format!("Mode set to {}", mode)));
            }
            ReplCommand::Speak {
                index,
                voice,
                model,
            } => self.speak(index, voice, model).await,
            ReplCommand::Play(index) => {
                self.with_clip(index, |clip, config| match &config.player {
                    Some(player) => play_clip(clip, player),
                    None => Err(AudioError::NoPlayer),
                });
            }
            ReplCommand::Save { index, path } => {
                if self.with_clip(index, |clip, _| save_clip(clip, &path)) {
                    println!("{}", ConsoleFormatter::notice(format!("Saved to {}", path.display())));
                }
            }
            ReplCommand::Voices => print!(
                "{}",
                ConsoleFormatter::format_voices(self.config.voice, self.config.speech_model)
            ),
            ReplCommand::Reset => {
                if self.slot.reset().is_some() {
                    println!("{}", ConsoleFormatter::notice("Conversation cleared"));
                }
                self.reload_resources();
            }
        }
        false
    }

    /// Re-read the resources for the next session. On failure the previous
    /// resources stay in place.
    fn reload_resources(&mut self) {
        let Some((use_case, input)) = &self.reload else {
            return;
        };
        match use_case.execute(input) {
            Ok(resources) => {
                for issue in &resources.issues {
                    println!("{}", ConsoleFormatter::format_resource_issue(issue));
                }
                debug!(
                    "Reloaded resources: system prompt {} chars, document {} chars",
                    resources.system_prompt.chars().count(),
                    resources.document.chars().count()
                );
                self.resources = resources;
            }
            Err(e) => {
                warn!("Resource reload failed: {}", e);
                eprintln!(
                    "{}",
                    ConsoleFormatter::error(format!("{e} Keeping the previous resources."))
                );
            }
        }
    }

    async fn speak(
        &mut self,
        index: Option<usize>,
        voice: Option<Voice>,
        model: Option<SpeechModel>,
    ) {
        let Some(session) = self.slot.get_mut() else {
            eprintln!("{}", ConsoleFormatter::error("No replies yet"));
            return;
        };
        let Some(index) = index.or_else(|| session.last_assistant_index()) else {
            eprintln!("{}", ConsoleFormatter::error("No replies yet"));
            return;
        };

        let input = SpeechInput::new(index)
            .with_voice(voice.unwrap_or(self.config.voice))
            .with_model(model.unwrap_or(self.config.speech_model));

        match self.speech.execute(session, input).await {
            Ok(Some(clip)) => println!(
                "{}",
                ConsoleFormatter::notice(format!(
                    "{} Audio ready for message {} ({} bytes). Use /play {} or /save {} <path>",
                    AUDIO_MARKER,
                    index,
                    clip.len(),
                    index,
                    index
                ))
            ),
            Ok(None) => eprintln!(
                "{}",
                ConsoleFormatter::error("Speech generation failed (see log for details)")
            ),
            Err(e) => eprintln!("{}", ConsoleFormatter::error(e)),
        }
    }

    /// Run `action` on the audio of message `index`, reporting any failure.
    fn with_clip<F>(&self, index: usize, action: F) -> bool
    where
        F: FnOnce(&AudioClip, &ReplConfig) -> Result<(), AudioError>,
    {
        let Some(clip) = self.slot.get().and_then(|s| s.audio(index)) else {
            eprintln!(
                "{}",
                ConsoleFormatter::error(format!("No audio for message {index}; run /speak {index} first"))
            );
            return false;
        };
        match action(clip, &self.config) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("{}", ConsoleFormatter::error(e));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docchat_application::{
        ChatParams, CompletionGateway, CompletionMode, CompletionRequest, GatewayError,
        ResourceError, ResourceLoaderPort, SpeechGateway,
    };
    use docchat_domain::{Role, SpeechRequest};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    struct EchoGateway {
        requests: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionGateway for EchoGateway {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(format!("reply {}", request.messages.len()))
        }
    }

    struct ToneGateway;

    #[async_trait]
    impl SpeechGateway for ToneGateway {
        async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioClip, GatewayError> {
            Ok(AudioClip::mp3(request.input.as_bytes().to_vec()))
        }
    }

    /// Files that can be edited between turns
    #[derive(Default)]
    struct EditableFiles(Mutex<HashMap<PathBuf, String>>);

    impl EditableFiles {
        fn write(&self, path: &str, text: &str) {
            self.0.lock().unwrap().insert(PathBuf::from(path), text.to_string());
        }

        fn remove(&self, path: &str) {
            self.0.lock().unwrap().remove(Path::new(path));
        }
    }

    impl ResourceLoaderPort for EditableFiles {
        fn load_text(&self, path: &Path) -> Result<String, ResourceError> {
            self.0
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| ResourceError::NotFound(path.to_path_buf()))
        }
    }

    fn reloading_repl(gateway: Arc<EchoGateway>, files: Arc<EditableFiles>, strict: bool) -> ChatRepl {
        let input = OpenSessionInput::new("prompt.txt", "doc.txt").with_strict(strict);
        let use_case = OpenSessionUseCase::new(files);
        let resources = use_case.execute(&input).unwrap();
        let mut repl = repl(gateway);
        repl.resources = resources;
        repl.with_resource_reload(use_case, input)
    }

    fn repl(gateway: Arc<EchoGateway>) -> ChatRepl {
        let resources = SessionResources {
            system_prompt: "Be brief.".to_string(),
            document: "The sky is green.".to_string(),
            issues: Vec::new(),
        };
        let params = ChatParams::default().with_mode(CompletionMode::Blocking);
        ChatRepl::new(
            resources,
            Model::default(),
            SendMessageUseCase::new(gateway, params),
            SynthesizeSpeechUseCase::new(Arc::new(ToneGateway)),
        )
        .with_config(ReplConfig {
            show_progress: false,
            ..Default::default()
        })
    }

    fn gateway() -> Arc<EchoGateway> {
        Arc::new(EchoGateway {
            requests: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_session_is_created_once_and_kept() {
        let gateway = gateway();
        let mut repl = repl(gateway.clone());
        assert!(repl.session().is_none());

        repl.ask("What colour is the sky?").await.unwrap();
        let outcome = repl.ask("Are you sure?").await.unwrap();

        assert_eq!(outcome.assistant_index, 3);
        let session = repl.session().unwrap();
        assert_eq!(session.len(), 4);
        assert_eq!(session.system_prompt(), "Be brief.");
        assert_eq!(gateway.requests.lock().unwrap()[1].messages.len(), 4);
    }

    #[tokio::test]
    async fn test_model_switch_applies_to_live_session() {
        let mut repl = repl(gateway());
        repl.ask("hi").await.unwrap();

        assert!(!repl.handle_command("/model gpt-4o").await);
        assert_eq!(repl.session().unwrap().model(), &Model::Gpt4o);
    }

    #[tokio::test]
    async fn test_speak_defaults_to_last_reply() {
        let mut repl = repl(gateway());
        repl.ask("hi").await.unwrap();

        repl.handle_command("/speak").await;
        let session = repl.session().unwrap();
        assert!(session.has_audio(1));
        assert_eq!(session.message(1).unwrap().role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_save_writes_stored_audio() {
        let mut repl = repl(gateway());
        repl.ask("hi").await.unwrap();
        repl.handle_command("/speak 1 echo").await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reply.mp3");
        repl.handle_command(&format!("/save 1 {}", path.display())).await;

        let expected = repl.session().unwrap().audio(1).unwrap().bytes().to_vec();
        assert_eq!(std::fs::read(&path).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_reset_and_quit() {
        let mut repl = repl(gateway());
        repl.ask("hi").await.unwrap();

        assert!(!repl.handle_command("/reset").await);
        assert!(repl.session().is_none());
        assert!(repl.handle_command("/quit").await);
    }

    #[tokio::test]
    async fn test_mode_switch() {
        let mut repl = repl(gateway());
        repl.handle_command("/mode streaming").await;
        assert_eq!(repl.send.params().mode, CompletionMode::Streaming);
    }

    #[tokio::test]
    async fn test_reset_reloads_resources_from_disk() {
        let gateway = gateway();
        let files = Arc::new(EditableFiles::default());
        files.write("prompt.txt", "Old prompt.");
        files.write("doc.txt", "Old doc.");
        let mut repl = reloading_repl(gateway.clone(), files.clone(), false);
        repl.ask("hi").await.unwrap();
        assert_eq!(repl.session().unwrap().system_prompt(), "Old prompt.");

        files.write("prompt.txt", "New prompt.");
        files.write("doc.txt", "New doc.");
        repl.handle_command("/reset").await;
        repl.ask("hi again").await.unwrap();

        assert_eq!(repl.session().unwrap().system_prompt(), "New prompt.");
        let requests = gateway.requests.lock().unwrap();
        let last = requests.last().unwrap();
        assert_eq!(last.messages.len(), 2);
        assert!(last.messages[1].content.contains("New doc."));
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_resources() {
        let files = Arc::new(EditableFiles::default());
        files.write("prompt.txt", "Kept prompt.");
        files.write("doc.txt", "Kept doc.");
        let mut repl = reloading_repl(gateway(), files.clone(), true);
        repl.ask("hi").await.unwrap();

        files.remove("doc.txt");
        repl.handle_command("/reset").await;
        assert!(repl.session().is_none());
        assert_eq!(repl.resources.system_prompt, "Kept prompt.");
        assert_eq!(repl.resources.document, "Kept doc.");
    }

    #[tokio::test]
    async fn test_reload_without_strict_reports_missing_file() {
        let files = Arc::new(EditableFiles::default());
        files.write("prompt.txt", "p");
        files.write("doc.txt", "d");
        let mut repl = reloading_repl(gateway(), files.clone(), false);

        files.remove("doc.txt");
        repl.handle_command("/reset").await;
        assert_eq!(repl.resources.document, "");
        assert_eq!(repl.resources.issues.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_message_is_sent() {
        let gateway = gateway();
        let mut repl = repl(gateway.clone());
        let outcome = repl.ask("  ").await.unwrap();

        assert!(outcome.failure.is_none());
        assert_eq!(repl.session().unwrap().message(0).unwrap().content, "  ");
        assert_eq!(gateway.requests.lock().unwrap().len(), 1);
    }
}
