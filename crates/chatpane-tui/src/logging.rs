use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "chatpane_tui=info,chatpane_core=info";
const LOG_PREFIX: &str = "chatpane.log";

/// The terminal belongs to the UI, so logs go to a daily file instead.
///
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init(dir: Option<PathBuf>) -> Result<WorkerGuard> {
    let dir = match dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };
    fs::create_dir_all(&dir)?;

    let (writer, guard) = file_writer(&dir);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer),
        )
        .try_init()?;

    Ok(guard)
}

fn file_writer(dir: &Path) -> (tracing_appender::non_blocking::NonBlocking, WorkerGuard) {
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_PREFIX);
    tracing_appender::non_blocking(appender)
}

fn default_log_dir() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::config_dir)
        .ok_or_else(|| anyhow!("Could not determine a directory for log files"))?;
    Ok(base.join("chatpane").join("logs"))
}
