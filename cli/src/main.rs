//! CLI entrypoint for docchat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use docchat_application::{
    ChatParams, CompletionGateway, CompletionMode, ConversationLogger, OpenSessionInput,
    OpenSessionUseCase, SendMessageUseCase, SynthesizeSpeechUseCase,
};
use docchat_domain::Model;
use docchat_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, LocalResourceLoader, OpenAiGateway,
};
use docchat_presentation::{ChatRepl, Cli, ConsoleFormatter, ReplConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_ref()) {
            println!("{line}");
        }
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
    }
    .map_err(|e| anyhow!("Failed to load configuration: {e}"))?;

    let log_dir = cli
        .log_dir
        .clone()
        .or_else(|| config.logging.log_dir.as_ref().map(PathBuf::from));
    let _guard = init_tracing(cli.verbose, log_dir.as_deref());

    info!("Starting docchat");
    for issue in config.validate() {
        warn!("Config {}", issue);
    }
    if !config.repl.color {
        ConsoleFormatter::set_color_enabled(false);
    }

    // === Session resources ===
    let input = OpenSessionInput::new(
        cli.system_prompt
            .clone()
            .unwrap_or_else(|| config.resources.system_prompt.clone()),
        cli.doc
            .clone()
            .unwrap_or_else(|| config.resources.external_doc.clone()),
    )
    .with_strict(cli.strict || config.resources.strict);
    let open_session = OpenSessionUseCase::new(Arc::new(LocalResourceLoader::new()));
    let resources = open_session.execute(&input)?;

    // === Dependency Injection ===
    let gateway = Arc::new(
        OpenAiGateway::new(config.openai.to_settings())
            .context("Failed to initialize the OpenAI client")?,
    );
    if let Err(e) = CompletionGateway::ensure_ready(gateway.as_ref()) {
        bail!("{e}");
    }

    let model = cli
        .model
        .as_deref()
        .map(Model::from_id)
        .unwrap_or_else(|| config.chat.parse_model());
    let mode = cli
        .mode
        .map(CompletionMode::from)
        .unwrap_or_else(|| config.chat.parse_mode().0);
    let params = ChatParams::default()
        .with_mode(mode)
        .with_apology(config.chat.apology.clone());

    let mut send = SendMessageUseCase::new(gateway.clone(), params);
    let mut speech = SynthesizeSpeechUseCase::new(gateway);
    if let Some(logger) = conversation_logger(&cli, &config) {
        send = send.with_conversation_logger(logger.clone());
        speech = speech.with_conversation_logger(logger);
    }

    let repl_config = ReplConfig {
        show_progress: config.repl.show_progress && !cli.quiet,
        history_file: config.repl.history_file.clone(),
        voice: config.speech.parse_voice().0,
        speech_model: config.speech.parse_model().0,
        player: config.speech.player.clone(),
    };

    info!("Model: {}, mode: {}", model, mode);

    match cli.message {
        // One-shot mode
        Some(message) => {
            for issue in &resources.issues {
                eprintln!("{}", ConsoleFormatter::format_resource_issue(issue));
            }
            let mut repl = ChatRepl::new(resources, model, send, speech).with_config(repl_config);
            let outcome = repl.ask(&message).await?;
            if let Some(e) = outcome.failure {
                bail!("Completion failed: {e}");
            }
        }
        None => {
            let mut repl = ChatRepl::new(resources, model, send, speech)
                .with_config(repl_config)
                .with_resource_reload(open_session, input);
            repl.run().await?;
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity level
///
/// Stderr follows `-v` (or `RUST_LOG`); the optional log directory always
/// receives info-level records, including every outbound request.
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let stderr_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    let (file_layer, guard) = match log_dir.map(open_log_file) {
        Some(Ok(appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new("info"));
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            eprintln!("warning: file logging disabled: {e}");
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    guard
}

/// Stderr filter used when `RUST_LOG` is unset. Request logging from the
/// send-message use case stays visible at the quietest level.
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn,docchat_application::use_cases::send_message=info",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    }
}

fn open_log_file(dir: &Path) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("docchat")
        .filename_suffix("log")
        .build(dir)
        .with_context(|| format!("cannot write logs to {}", dir.display()))
}

fn conversation_logger(cli: &Cli, config: &FileConfig) -> Option<Arc<dyn ConversationLogger>> {
    let path = cli
        .conversation_log
        .clone()
        .or_else(|| config.logging.conversation_log.as_ref().map(PathBuf::from))?;
    let logger = JsonlConversationLogger::open(&path)?;
    info!("Conversation log: {}", logger.path().display());
    Some(Arc::new(logger))
}
