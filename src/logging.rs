//! Structured JSONL logging plus human-readable stderr output.
//!
//! The library only emits `tracing` events. Hosts that want the same dual
//! output the organizer uses during development call [`init`] once:
//!
//! ```rust,ignore
//! let _guard = prompt_organizer::logging::init(None);
//! tracing::info!(event_type = "host_start", "Host started");
//! ```
//!
//! Each JSONL line is a standalone JSON object:
//! ```json
//! {"timestamp":"2026-10-18T10:30:45.123Z","level":"INFO","target":"prompt_organizer::snapshot","fields":{"message":"Snapshot applied","changed":2}}
//! ```

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "prompt-organizer.jsonl";

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the dual-output logging system.
///
/// `log_dir` defaults to `~/.prompt-organizer/logs`. Returns a guard that
/// MUST be kept alive; dropping it flushes remaining lines to disk.
/// Calling this twice leaves the first subscriber installed.
pub fn init(log_dir: Option<&Path>) -> LoggingGuard {
    let log_dir = log_dir.map(Path::to_path_buf).unwrap_or_else(default_log_dir);
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join(LOG_FILE_NAME);

    let (non_blocking_file, file_guard) = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => tracing_appender::non_blocking(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            tracing_appender::non_blocking(std::io::sink())
        }
    };

    // Default to info, allow override via RUST_LOG
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .is_ok();

    tracing::info!(
        event_type = "lifecycle",
        action = "logging_initialized",
        installed,
        log_path = %log_path.display(),
        "Organizer logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Get the default log directory path (~/.prompt-organizer/logs/)
fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".prompt-organizer").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("prompt-organizer-logs"))
}

/// Path of the JSONL log file inside `log_dir`
pub fn log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

/// Log a store persistence event with structured fields
pub fn log_store_event(store: &str, action: &str, key: &str, success: bool) {
    if success {
        tracing::debug!(
            event_type = "store_event",
            store = store,
            action = action,
            key = key,
            success,
            "Store {} {}", action, key
        );
    } else {
        tracing::warn!(
            event_type = "store_event",
            store = store,
            action = action,
            key = key,
            success,
            "Store {} {} failed", action, key
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_joins_file_name() {
        let path = log_path(Path::new("/tmp/organizer"));
        assert_eq!(path, PathBuf::from("/tmp/organizer/prompt-organizer.jsonl"));
    }

    #[test]
    fn test_init_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let guard = init(Some(dir.path()));
        tracing::info!("hello from test");
        drop(guard);
        assert!(log_path(dir.path()).exists());
    }
}
