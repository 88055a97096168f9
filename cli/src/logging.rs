use std::path::Path;

use anyhow::{anyhow, Context};
use dotshim_core::config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// Logging is off unless a filter is configured, because stderr carries the
/// relayed toolchain output. With a log file configured the returned guard
/// must be held until exit so buffered records are flushed.
pub fn init(cfg: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&cfg.filter)
        .with_context(|| format!("invalid log filter: {}", cfg.filter))?;

    match &cfg.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("log file has no file name: {file}"))?;

            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(name.to_string_lossy())
                .build(dir)
                .with_context(|| format!("cannot open log file: {file}"))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;
            Ok(None)
        }
    }
}
