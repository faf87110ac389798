//! File logging for the CLI binary: search summaries and perft divide output
//! go to a log file so they stay out of the interactive prompt.

use std::io;
use std::path::Path;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, EnvFilter};

// Keeping the guard alive keeps the non-blocking writer flushing for the
// lifetime of the process; it also serves as the one-time init gate.
static GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// The targets this crate emits on, at their useful default levels.
const ENGINE_TARGETS: &[(&str, &str)] = &[
    ("outpost::search", "debug"),
    ("outpost::moves::perft", "trace"),
];

fn engine_filter() -> EnvFilter {
    let directives = ENGINE_TARGETS
        .iter()
        .map(|(target, level)| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::try_new(format!("{directives},info")).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the process-wide file logger once; later calls are no-ops. A
/// `RUST_LOG` setting overrides the engine defaults. An unwritable path is
/// reported to the caller rather than aborting the CLI.
pub fn init_logging<P: AsRef<Path>>(path: P) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let (writer, guard) = tracing_appender::non_blocking(file);
    if GUARD.set(guard).is_err() {
        // Someone already initialized logging; keep the first writer.
        return Ok(());
    }

    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else {
        engine_filter()
    };

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .finish();

    // Idempotent when a subscriber is already installed (tests, embedding).
    let _ = tracing::subscriber::set_global_default(subscriber);
    Ok(())
}
