//! oxprompt entrypoint.
use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Once;

use anyhow::Result;
use clap::Parser;
use core_prompt::RunOutcome;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

mod console;

const LOG_FILE: &str = "oxprompt.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "oxprompt", version, about = "Interactive prompt demo")]
struct Args {
    /// Configuration file path (overrides discovery of `oxprompt.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Initial history entries separated by `;`.
    #[arg(long = "history")]
    history: Option<String>,
    /// Directory receiving `oxprompt.log`.
    #[arg(long = "log-dir", default_value = ".")]
    log_dir: PathBuf,
}

impl Args {
    fn history_entries(&self) -> Vec<String> {
        self.history
            .as_deref()
            .map(|h| h.split(';').map(str::to_string).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownReason {
    Finished,
    Signal(i32),
}

impl ShutdownReason {
    fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::Finished => "finished",
            ShutdownReason::Signal(_) => "signal",
        }
    }
}

impl From<RunOutcome> for ShutdownReason {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Finished => ShutdownReason::Finished,
            RunOutcome::Signal(code) => ShutdownReason::Signal(code),
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logs go to a file: the terminal belongs to the prompt.
fn configure_logging(log_dir: &Path) -> Option<WorkerGuard> {
    let log_path = log_dir.join(LOG_FILE);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => Some(guard),
        // Global subscriber already installed; dropping the guard stops the writer.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_guard = configure_logging(&args.log_dir);
    install_panic_hook();
    info!(target: "runtime", "startup");

    let config = core_config::load_from(args.config.clone())?;
    let history = args.history_entries();
    info!(
        target: "runtime.startup",
        config = config.path.as_ref().map(|p| p.display().to_string()).as_deref(),
        history = history.len(),
        "bootstrap_complete"
    );

    let session = Rc::new(RefCell::new(console::Session::default()));
    let mut prompt = console::builder(session)
        .history(history)
        .apply_config(&config)
        .build()?;
    let reason = ShutdownReason::from(prompt.run()?);
    info!(target: "runtime.shutdown", %reason, "shutdown");

    if let ShutdownReason::Signal(code) = reason {
        // Flush pending log lines before the process goes away.
        drop(log_guard);
        std::process::exit(code);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn history_flag_splits_on_semicolons() {
        let args = Args::parse_from(["oxprompt", "--history", "ls;git status;"]);
        assert_eq!(args.history_entries(), vec!["ls", "git status", ""]);
        let args = Args::parse_from(["oxprompt"]);
        assert!(args.history_entries().is_empty());
        assert_eq!(args.log_dir, PathBuf::from("."));
    }

    #[test]
    fn shutdown_reason_from_outcome() {
        assert_eq!(ShutdownReason::from(RunOutcome::Signal(1)), ShutdownReason::Signal(1));
        assert_eq!(ShutdownReason::from(RunOutcome::Finished).to_string(), "finished");
    }
}
