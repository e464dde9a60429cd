//! Logging setup on top of `tracing`.
//!
//! The terminal belongs to the TUI, so log output goes to a daily rotated file
//! in the local data directory:
//! - Linux: `~/.local/share/dispatchdesk/logs/`
//! - macOS: `~/Library/Application Support/dispatchdesk/logs/`
//! - Windows: `C:\Users\<User>\AppData\Local\dispatchdesk\logs\`
//!
//! `RUST_LOG` overrides the default filter, e.g. `RUST_LOG=dispatchdesk=debug`
//! to see every query the list controllers build.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_FILTER: &str = "dispatchdesk=info,warn";

const LOG_FILE_PREFIX: &str = "dispatchdesk.log";

/// Install the global subscriber.
///
/// # Errors
///
/// Fails when the log directory cannot be resolved or created, or when a
/// global subscriber is already installed.
pub fn init() -> anyhow::Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(env_filter());

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dispatchdesk starting up");
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");

    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("dispatchdesk").join("logs"))
}

/// Where log files are written, for display in error messages.
pub fn log_directory() -> Option<PathBuf> {
    get_log_directory().ok()
}

pub fn shutdown() {
    tracing::info!("dispatchdesk shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_layout() {
        let dir = log_directory().unwrap();
        assert!(dir.ends_with("dispatchdesk/logs"));
    }
}
