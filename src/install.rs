//! Backup-and-replace installation of the module folder.
//!
//! An existing, non-empty destination is either renamed to a timestamped
//! `.BAK-YYYYMMDD-HHMMSS` sibling or deleted, then the source tree is copied
//! into place. A failed backup stops the run before anything is removed; a
//! failure after that point leaves whatever was copied so far.

use chrono::{Local, NaiveDateTime};
use std::{
    fmt, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::fs_ops;

pub const BACKUP_MARKER: &str = ".BAK-";
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub backup_requested: bool,
    pub proceed_with_copy: bool,
}

impl InstallRequest {
    pub fn new(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
            backup_requested: true,
            proceed_with_copy: true,
        }
    }

    pub fn with_backup(mut self, backup_requested: bool) -> Self {
        self.backup_requested = backup_requested;
        self
    }

    pub fn with_proceed(mut self, proceed_with_copy: bool) -> Self {
        self.proceed_with_copy = proceed_with_copy;
        self
    }
}

/// What [`install_at`] is about to do, worked out before anything is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub existing_install: bool,
    pub backup_dir: Option<PathBuf>,
}

impl fmt::Display for InstallPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.backup_dir, self.existing_install) {
            (Some(backup), _) => writeln!(f, "Creating backup folder : {}", backup.display())?,
            (None, true) => writeln!(
                f,
                "Existing install at {} will be replaced without a backup",
                self.dest_dir.display()
            )?,
            (None, false) => {}
        }
        write!(
            f,
            "Copying from : {}\nTo : {}",
            self.source_dir.display(),
            self.dest_dir.display()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub backup_dir: Option<PathBuf>,
    pub replaced_existing: bool,
    pub files_copied: usize,
}

impl fmt::Display for InstallReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(backup) = &self.backup_dir {
            writeln!(f, "Backup complete : {}", backup.display())?;
        } else if self.replaced_existing {
            writeln!(f, "Previous install removed (no backup requested)")?;
        }
        write!(
            f,
            "Image Quizzer copy complete ({} files)\nCopied from : {}\nTo : {}",
            self.files_copied,
            self.source_dir.display(),
            self.dest_dir.display()
        )
    }
}

/// How far the destructive part of an install got before a copy failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorInstall {
    None,
    MovedToBackup(PathBuf),
    Deleted,
    PartiallyDeleted,
}

impl fmt::Display for PriorInstall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorInstall::None => write!(f, "there was no previous install"),
            PriorInstall::MovedToBackup(backup) => write!(
                f,
                "the previous install was moved to {}",
                backup.display()
            ),
            PriorInstall::Deleted => {
                write!(f, "the previous install had already been deleted (no backup)")
            }
            PriorInstall::PartiallyDeleted => write!(
                f,
                "the previous install may have been partly deleted (no backup)"
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Cannot install from {}: {reason}", path.display())]
    InvalidSource { path: PathBuf, reason: String },
    #[error("Cannot install to {}: {reason}", path.display())]
    InvalidDestination { path: PathBuf, reason: String },
    #[error("Install location's parent folder does not exist: {}", .0.display())]
    MissingDestinationParent(PathBuf),
    #[error(
        "Backup of {} to {} failed, nothing was copied: {source}",
        dest.display(),
        backup.display()
    )]
    BackupFailed {
        dest: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(
        "Error installing Image Quizzer software to {}; {prior}: {source}",
        dest.display()
    )]
    CopyFailed {
        dest: PathBuf,
        prior: PriorInstall,
        #[source]
        source: io::Error,
    },
    #[error("Install cancelled, nothing was changed")]
    Cancelled,
}

pub fn timestamp(now: NaiveDateTime) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// `<dest>.BAK-<timestamp>` as a sibling of `dest`.
pub fn backup_dir_for(dest: &Path, now: NaiveDateTime) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(BACKUP_MARKER);
    name.push(timestamp(now));
    dest.with_file_name(name)
}

pub fn install(request: &InstallRequest) -> Result<InstallReport, InstallError> {
    install_at(request, Local::now().naive_local())
}

pub fn plan_install(request: &InstallRequest, now: NaiveDateTime) -> Result<InstallPlan, InstallError> {
    validate(request)?;
    let dest = &request.dest_dir;
    let existing_install = dest.is_dir() && fs_ops::dir_has_entries(dest).unwrap_or(true);
    let backup_dir = (existing_install && request.backup_requested)
        .then(|| backup_dir_for(dest, now));
    Ok(InstallPlan {
        source_dir: request.source_dir.clone(),
        dest_dir: dest.clone(),
        existing_install,
        backup_dir,
    })
}

pub fn install_at(request: &InstallRequest, now: NaiveDateTime) -> Result<InstallReport, InstallError> {
    let plan = plan_install(request, now)?;
    if !request.proceed_with_copy {
        tracing::info!("install to {} cancelled by caller", plan.dest_dir.display());
        return Err(InstallError::Cancelled);
    }
    let dest = &plan.dest_dir;

    let mut prior = PriorInstall::None;

    if let Some(backup) = &plan.backup_dir {
        tracing::info!("backing up {} -> {}", dest.display(), backup.display());
        if backup.exists() {
            return Err(InstallError::BackupFailed {
                dest: dest.clone(),
                backup: backup.clone(),
                source: io::Error::new(io::ErrorKind::AlreadyExists, "backup folder already exists"),
            });
        }
        std::fs::rename(dest, backup).map_err(|source| InstallError::BackupFailed {
            dest: dest.clone(),
            backup: backup.clone(),
            source,
        })?;
        prior = PriorInstall::MovedToBackup(backup.clone());
    }

    if dest.exists() {
        tracing::info!("removing {}", dest.display());
        fs_ops::remove_dir_recursive(dest)
            .map_err(|source| failed_delete(dest, plan.existing_install, source))?;
        if plan.existing_install {
            prior = PriorInstall::Deleted;
        }
    }

    tracing::info!("copying {} -> {}", plan.source_dir.display(), dest.display());
    let files_copied = fs_ops::copy_dir_recursive(&plan.source_dir, dest).map_err(|source| {
        tracing::error!("copy into {} failed: {source}", dest.display());
        InstallError::CopyFailed {
            dest: dest.clone(),
            prior: prior.clone(),
            source,
        }
    })?;

    tracing::info!("install complete, {files_copied} files copied");
    Ok(InstallReport {
        source_dir: plan.source_dir,
        dest_dir: plan.dest_dir,
        replaced_existing: plan.existing_install,
        backup_dir: plan.backup_dir,
        files_copied,
    })
}

/// `remove_dir_all` can fail after unlinking part of the tree.
fn failed_delete(dest: &Path, existing_install: bool, source: io::Error) -> InstallError {
    tracing::error!("removing {} failed: {source}", dest.display());
    let prior = if existing_install {
        PriorInstall::PartiallyDeleted
    } else {
        PriorInstall::None
    };
    InstallError::CopyFailed {
        dest: dest.to_path_buf(),
        prior,
        source,
    }
}

fn validate(request: &InstallRequest) -> Result<(), InstallError> {
    let source = &request.source_dir;
    let invalid = |reason: &str| InstallError::InvalidSource {
        path: source.clone(),
        reason: reason.to_string(),
    };
    if !source.is_dir() {
        return Err(invalid("folder does not exist"));
    }
    match fs_ops::dir_has_entries(source) {
        Ok(true) => {}
        Ok(false) => return Err(invalid("folder is empty")),
        Err(err) => return Err(invalid(&format!("folder is not readable: {err}"))),
    }

    let dest = &request.dest_dir;
    if dest.exists() && !dest.is_dir() {
        return Err(InstallError::InvalidDestination {
            path: dest.clone(),
            reason: "a file with this name is in the way".to_string(),
        });
    }
    let parent = match dest.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => return Err(InstallError::MissingDestinationParent(dest.clone())),
    };
    let parent = parent
        .canonicalize()
        .map_err(|_| InstallError::MissingDestinationParent(dest.clone()))?;
    let source = source
        .canonicalize()
        .map_err(|err| invalid(&format!("folder is not readable: {err}")))?;
    let dest_resolved = match dest.file_name() {
        Some(name) => parent.join(name),
        None => return Err(InstallError::MissingDestinationParent(dest.clone())),
    };
    if dest_resolved.starts_with(&source) {
        return Err(invalid("install location is inside the folder being installed"));
    }
    if source.starts_with(&dest_resolved) {
        return Err(invalid("folder being installed is inside the install location"));
    }
    Ok(())
}
