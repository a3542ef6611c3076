//! Tracing setup for the binary

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set
fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber.
///
/// With a log file, events go through a non-blocking writer at debug level and
/// the returned guard must live until the process exits. Otherwise events go
/// to stderr at info level.
pub fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    match log_file {
        Some(path) => {
            let file = open_log_file(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);

            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true);

            tracing_subscriber::registry()
                .with(env_filter("debug,hyper=info,h2=info,rustls=info"))
                .with(file_layer)
                .try_init()
                .context("failed to install tracing subscriber")?;
            Ok(Some(guard))
        }
        None => {
            let console_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(true)
                .compact()
                .with_target(true);

            tracing_subscriber::registry()
                .with(env_filter("info"))
                .with(console_layer)
                .try_init()
                .context("failed to install tracing subscriber")?;
            Ok(None)
        }
    }
}

/// Append-only, created owner-readable on Unix
fn open_log_file(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}
