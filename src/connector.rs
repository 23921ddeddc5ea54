//! Registers the module's code folder in Slicer's additional module paths.
//!
//! Slicer writes its settings to `<slicer>/NA-MIC/Slicer-<build>.ini`; the
//! build number differs between releases, so the file is found by pattern.
//! When the module lives on removable media its drive letter changes between
//! machines, which is why stale entries are stripped before the current path
//! is appended.

use regex::Regex;
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::{config, fs_ops, path_list, paths};

const WRITE_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectReport {
    pub settings_file: PathBuf,
    pub code_path: String,
    pub removed: usize,
    pub changed: bool,
}

impl fmt::Display for ConnectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.changed {
            writeln!(f, "Slicer module list updated : {}", self.settings_file.display())?;
        } else {
            writeln!(
                f,
                "Slicer module list already up to date : {}",
                self.settings_file.display()
            )?;
        }
        write!(f, "Module path : {}", self.code_path)?;
        if self.removed > 0 {
            write!(f, " (replaced {} previous entries)", self.removed)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error(
        "Cannot connect Image Quizzer module to Slicer: no {}*.{} file in {}. Either the location specified for Slicer is incorrect or the Slicer extensions have not been installed yet.",
        config::SETTINGS_PREFIX,
        config::SETTINGS_EXTENSION,
        search_dir.display()
    )]
    ConfigNotFound { search_dir: PathBuf },
    #[error(
        "Cannot connect Image Quizzer module to Slicer: {} folder is missing. Set the Image Quizzer location to the installation directory.",
        .0.display()
    )]
    ModulePathInvalid(PathBuf),
    #[error(
        "Slicer module list not updated: no {}= line in {}",
        config::PATHS_KEY,
        .0.display()
    )]
    ModuleListNotUpdated(PathBuf),
    #[error("{0}")]
    InvalidArguments(String),
    #[error("Cannot update {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn settings_pattern() -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        "^{}.*\\.{}$",
        regex::escape(config::SETTINGS_PREFIX),
        regex::escape(config::SETTINGS_EXTENSION)
    ))
}

/// First `Slicer*.ini` file in `search_dir`, by name.
pub fn find_settings_file(search_dir: &Path) -> io::Result<Option<PathBuf>> {
    let pattern =
        settings_pattern().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let mut names = Vec::new();
    for entry in fs::read_dir(search_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if pattern.is_match(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names.first().map(|name| search_dir.join(name)))
}

pub fn connect_path(module_dir: &Path, host_app_dir: &Path) -> Result<ConnectReport, ConnectError> {
    let search_dir = paths::settings_dir(host_app_dir);
    if !search_dir.is_dir() {
        tracing::warn!("settings folder {} not found", search_dir.display());
        return Err(ConnectError::ConfigNotFound { search_dir });
    }
    let settings_file = find_settings_file(&search_dir)
        .map_err(|source| ConnectError::ConfigIo {
            path: search_dir.clone(),
            source,
        })?
        .ok_or_else(|| ConnectError::ConfigNotFound {
            search_dir: search_dir.clone(),
        })?;
    tracing::info!("updating modules list in {}", settings_file.display());

    let code_dir = paths::module_code_dir(module_dir);
    if !code_dir.is_dir() {
        tracing::warn!("module code folder {} not found", code_dir.display());
        return Err(ConnectError::ModulePathInvalid(code_dir));
    }
    let code_dir = std::path::absolute(&code_dir).map_err(|source| ConnectError::ConfigIo {
        path: code_dir.clone(),
        source,
    })?;
    let code_path = paths::to_ini_path(&code_dir);

    let io_err = |source: io::Error| ConnectError::ConfigIo {
        path: settings_file.clone(),
        source,
    };
    let contents = fs::read_to_string(&settings_file).map_err(io_err)?;
    let patch = path_list::patch_contents(
        &contents,
        &config::paths_key_prefix(),
        &config::module_sentinel(),
        &code_path,
    )
    .ok_or_else(|| ConnectError::ModuleListNotUpdated(settings_file.clone()))?;

    let changed = patch.contents != contents;
    if changed {
        fs_ops::write_bytes_with_retry(&settings_file, patch.contents.as_bytes(), WRITE_ATTEMPTS)
            .map_err(io_err)?;
        tracing::info!(
            "module list updated with {code_path}, {} stale entries removed",
            patch.removed
        );
    } else {
        tracing::info!("module list already contains {code_path}");
    }

    Ok(ConnectReport {
        settings_file,
        code_path,
        removed: patch.removed,
        changed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_versioned_settings_file() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Slicer-29738.ini"), "").unwrap();
        fs::write(tmp.path().join("Slicer-29738.ini.bak"), "").unwrap();
        fs::write(tmp.path().join("SlicerLauncherSettings.txt"), "").unwrap();
        fs::create_dir_all(tmp.path().join("Slicer-folder.ini")).unwrap();

        let found = find_settings_file(tmp.path()).unwrap();
        assert_eq!(found, Some(tmp.path().join("Slicer-29738.ini")));
    }

    #[test]
    fn picks_first_name_when_several_match() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Slicer-31938.ini"), "").unwrap();
        fs::write(tmp.path().join("Slicer-29738.ini"), "").unwrap();

        let found = find_settings_file(tmp.path()).unwrap();
        assert_eq!(found, Some(tmp.path().join("Slicer-29738.ini")));
    }

    #[test]
    fn error_messages_name_the_location() {
        let err = ConnectError::ConfigNotFound {
            search_dir: PathBuf::from("/opt/Slicer/NA-MIC"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/opt/Slicer/NA-MIC"));
        assert!(msg.contains("Slicer*.ini"));
    }
}
