use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config;

pub const ROOT_ENV: &str = "IQ_SETUP_ROOT";

/// Directory the utilities treat as "where the download was unpacked".
pub fn root_dir() -> Result<PathBuf> {
    if let Ok(dev_root) = std::env::var(ROOT_ENV) {
        if !dev_root.trim().is_empty() {
            return Ok(PathBuf::from(dev_root));
        }
    }
    std::env::current_dir().context("current_dir")
}

fn parent_or_self(cwd: &Path) -> &Path {
    cwd.parent().unwrap_or(cwd)
}

pub fn default_install_dir(cwd: &Path) -> PathBuf {
    parent_or_self(cwd).join(config::INSTALL_FOLDER)
}

pub fn default_module_dir(cwd: &Path) -> PathBuf {
    parent_or_self(cwd).join(config::INSTALL_FOLDER)
}

pub fn default_host_app_dir(cwd: &Path) -> PathBuf {
    parent_or_self(cwd).to_path_buf()
}

/// `<module>/ImageQuizzer/Code`, joined component by component so the
/// native separator is used on disk.
pub fn module_code_dir(module_dir: &Path) -> PathBuf {
    config::MODULE_SUBPATH
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(module_dir.to_path_buf(), |acc, part| acc.join(part))
}

pub fn settings_dir(host_app_dir: &Path) -> PathBuf {
    host_app_dir.join(config::SETTINGS_SUBFOLDER)
}

/// Forward-slash form written into ini files.
pub fn to_ini_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
