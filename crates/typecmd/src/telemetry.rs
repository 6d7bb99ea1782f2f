//! Diagnostic logging for the library and the demo binary.
//!
//! User-facing output never goes through here; this only carries the
//! `tracing` events emitted while registering and dispatching.

use std::fs::{File, OpenOptions};
use std::io::IsTerminal;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::{DEFAULT_LOG_LEVEL, TelemetryConfig};

/// Flushes the log file writer on drop. Hold it until the process ends.
#[derive(Debug)]
pub struct TelemetryGuard {
    _worker: Option<WorkerGuard>,
    installed: bool,
}

impl TelemetryGuard {
    /// Whether this call installed the global subscriber.
    pub fn is_installed(&self) -> bool {
        self.installed
    }
}

struct Sink {
    writer: BoxMakeWriter,
    worker: Option<WorkerGuard>,
    ansi: bool,
}

impl Sink {
    fn stderr() -> Self {
        Self {
            writer: BoxMakeWriter::new(std::io::stderr),
            worker: None,
            ansi: std::io::stderr().is_terminal(),
        }
    }

    fn file(file: File) -> Self {
        let (writer, worker) = tracing_appender::non_blocking(file);
        Self {
            writer: BoxMakeWriter::new(writer),
            worker: Some(worker),
            ansi: false,
        }
    }

    /// The configured file, or stderr when none is set or it cannot be
    /// opened for appending.
    fn for_config(config: &TelemetryConfig) -> Self {
        let Some(path) = config.log_file.as_deref() else {
            return Self::stderr();
        };
        match open_append(path) {
            Ok(file) => Self::file(file),
            Err(err) => {
                eprintln!(
                    "Warning: failed to open log file {}: {}",
                    path.display(),
                    err
                );
                Self::stderr()
            }
        }
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// `RUST_LOG` wins over the configured level; an unparsable level falls
/// back to the default.
fn filter_for(config: &TelemetryConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Install the global subscriber. Later calls leave the first one in place
/// and return a guard that is not installed.
pub fn init_tracing(config: &TelemetryConfig) -> TelemetryGuard {
    let sink = Sink::for_config(config);

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter_for(config))
        .with_target(false)
        .with_thread_names(true)
        .with_ansi(sink.ansi)
        .with_writer(sink.writer)
        .try_init()
        .is_ok();

    TelemetryGuard {
        _worker: sink.worker.filter(|_| installed),
        installed,
    }
}
