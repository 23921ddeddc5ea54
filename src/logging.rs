use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::EnvFilter;

/// Keeps the background log writer alive; drop it last so pending lines are
/// flushed.
pub struct LogGuard {
    pub path: PathBuf,
    _worker: WorkerGuard,
}

pub fn logs_dir() -> PathBuf {
    directories::ProjectDirs::from("ca", "Baines", crate::config::NAME)
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join(crate::config::NAME).join("logs"))
}

pub fn init(dir: &Path, file_name: &str) -> Result<LogGuard> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let log_path = dir.join(file_name);
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
        .with_context(|| format!("open {}", log_path.display()))?;
    let (writer, worker) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed when several tests share a process.
    let _ = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(filter)
        .with_ansi(false)
        .try_init();

    Ok(LogGuard {
        path: log_path,
        _worker: worker,
    })
}
