//! Run logs for `amirror`: appended to `amirror.log` in the XDG state dir,
//! or written to stderr when that file cannot be opened.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const APP_DIR: &str = "amirror";
const LOG_FILE: &str = "amirror.log";

/// Our own targets at debug; libcurl glue and tokio stay at info. `RUST_LOG` overrides.
const DEFAULT_DIRECTIVES: &str = "info,amirror=debug,amirror_core=debug";

/// Destination of one formatted event.
enum EventSink {
    Log(File),
    /// The shared log handle could not be cloned for this event.
    Stderr,
}

impl io::Write for EventSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            EventSink::Log(f) => f.write(buf),
            EventSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            EventSink::Log(f) => f.flush(),
            EventSink::Stderr => io::stderr().lock().flush(),
        }
    }
}

/// Hands every event its own clone of the append-mode log handle.
struct RunLog(File);

impl<'a> MakeWriter<'a> for RunLog {
    type Writer = EventSink;

    fn make_writer(&'a self) -> Self::Writer {
        match self.0.try_clone() {
            Ok(f) => EventSink::Log(f),
            Err(_) => EventSink::Stderr,
        }
    }
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// `$XDG_STATE_HOME/amirror/amirror.log`.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_DIR)?;
    Ok(xdg_dirs.get_state_home().join(APP_DIR).join(LOG_FILE))
}

fn open_run_log(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))
}

/// Installs the file subscriber and returns the log path. On error nothing is
/// installed, so the caller can still fall back to `init_logging_stderr`.
pub fn init_logging() -> Result<PathBuf> {
    let path = log_file_path()?;
    let file = open_run_log(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(BoxMakeWriter::new(RunLog(file)))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "amirror run log at {}",
        path.display()
    );
    Ok(path)
}

/// Stderr-only subscriber. A no-op when one is already installed.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
