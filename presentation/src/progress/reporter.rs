//! Live rendering of a reply while the request is in flight

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use docchat_application::ReplyObserver;
use docchat_domain::Model;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Prints streamed chunks as they arrive and shows a spinner while a
/// blocking request is pending
pub struct ProgressReporter {
    show_spinner: bool,
    spinner: Mutex<Option<ProgressBar>>,
    streamed: AtomicBool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            show_spinner: true,
            spinner: Mutex::new(None),
            streamed: AtomicBool::new(false),
        }
    }

    /// Reporter that never draws a spinner (`--quiet`, non-terminal output)
    pub fn without_spinner() -> Self {
        Self {
            show_spinner: false,
            ..Self::new()
        }
    }

    /// Whether any chunk was printed during the last request
    pub fn streamed(&self) -> bool {
        self.streamed.load(Ordering::SeqCst)
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplyObserver for ProgressReporter {
    fn on_request_start(&self, model: &Model, streaming: bool) {
        self.streamed.store(false, Ordering::SeqCst);
        if streaming || !self.show_spinner {
            return;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_message(format!("Waiting for {}...", model));
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut spinner) = self.spinner.lock() {
            *spinner = Some(pb);
        }
    }

    fn on_delta(&self, chunk: &str) {
        let mut stdout = std::io::stdout().lock();
        if !self.streamed.swap(true, Ordering::SeqCst) {
            let _ = writeln!(stdout, "{}", ConsoleFormatter::reply_heading(None));
        }
        let _ = write!(stdout, "{chunk}");
        let _ = stdout.flush();
    }

    fn on_request_end(&self) {
        if let Ok(mut spinner) = self.spinner.lock()
            && let Some(pb) = spinner.take()
        {
            pb.finish_and_clear();
        }
        if self.streamed() {
            println!();
        }
    }

    fn on_failure(&self, error: &str) {
        eprintln!("{} {}", "x".red(), error);
    }
}
