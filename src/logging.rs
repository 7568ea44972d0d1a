//! Tracing setup
//!
//! Logs go to stderr so stdout carries only the report. `RUST_LOG` overrides
//! the default level. With a log file, records are written as JSON through a
//! non-blocking appender.

use std::path::Path;

use anyhow::{Context, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "engine_range=debug"
    } else {
        "engine_range=info"
    }
}

/// Install the global subscriber.
///
/// The returned guard must be held until exit or buffered file records are lost.
pub fn init(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = env_filter(verbose);

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .map_err(|e| anyhow!(e))?;
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("Invalid log file path: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        dir, file_name,
    ));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!(e))?;

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directive_depends_on_verbosity() {
        assert_eq!(default_directive(false), "engine_range=info");
        assert_eq!(default_directive(true), "engine_range=debug");
    }
}
