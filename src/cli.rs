use clap::Parser;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use crate::{config, connector::ConnectError, install::InstallRequest, paths};

/// Copy the Image Quizzer into place, backing up any previous install.
#[derive(Debug, Parser)]
#[command(name = "setup-installer", version = config::VERSION)]
pub struct InstallArgs {
    /// Install location [default: <parent of working dir>/BainesImageQuizzer]
    pub dest: Option<PathBuf>,
    /// Folder to install from [default: working dir]
    #[arg(long)]
    pub source: Option<PathBuf>,
    /// Replace an existing install without keeping a .BAK copy
    #[arg(long)]
    pub no_backup: bool,
    /// Show what would happen and stop
    #[arg(long)]
    pub dry_run: bool,
}

impl InstallArgs {
    pub fn into_request(self, cwd: &Path) -> InstallRequest {
        let source = self.source.unwrap_or_else(|| cwd.to_path_buf());
        let dest = self
            .dest
            .unwrap_or_else(|| paths::default_install_dir(cwd));
        InstallRequest::new(source, dest)
            .with_backup(!self.no_backup)
            .with_proceed(!self.dry_run)
    }
}

/// Add the Image Quizzer to Slicer's additional module paths.
#[derive(Debug, Parser)]
#[command(
    name = "module-connector",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct ConnectArgs {
    /// Folder the Image Quizzer was installed to
    pub module_path: PathBuf,
    /// Slicer installation folder
    pub host_app_path: PathBuf,
}

/// Exactly two positional arguments; anything else is reported with usage.
pub fn parse_connect_args<I, T>(args: I) -> Result<ConnectArgs, ConnectError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    ConnectArgs::try_parse_from(args)
        .map_err(|err| ConnectError::InvalidArguments(err.render().to_string().trim_end().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_args_require_two_paths() {
        let args = parse_connect_args(["module-connector", "E:/IQ", "C:/Slicer"]).unwrap();
        assert_eq!(args.module_path, PathBuf::from("E:/IQ"));
        assert_eq!(args.host_app_path, PathBuf::from("C:/Slicer"));

        for bad in [
            vec!["module-connector"],
            vec!["module-connector", "E:/IQ"],
            vec!["module-connector", "E:/IQ", "C:/Slicer", "extra"],
            vec!["module-connector", "--force", "E:/IQ", "C:/Slicer"],
        ] {
            let err = parse_connect_args(bad).unwrap_err();
            assert!(matches!(err, ConnectError::InvalidArguments(_)));
            assert!(err.to_string().contains("Usage"));
        }
    }

    #[test]
    fn install_args_default_from_cwd() {
        let cwd = PathBuf::from("/media/usb/Download");
        let args = InstallArgs::try_parse_from(["setup-installer"]).unwrap();
        let request = args.into_request(&cwd);
        assert_eq!(request.source_dir, cwd);
        assert_eq!(
            request.dest_dir,
            PathBuf::from("/media/usb/BainesImageQuizzer")
        );
        assert!(request.backup_requested);
        assert!(request.proceed_with_copy);
    }

    #[test]
    fn install_args_flags_map_to_decisions() {
        let args = InstallArgs::try_parse_from([
            "setup-installer",
            "/opt/IQ",
            "--source",
            "/tmp/dl",
            "--no-backup",
            "--dry-run",
        ])
        .unwrap();
        let request = args.into_request(Path::new("/ignored"));
        assert_eq!(request.dest_dir, PathBuf::from("/opt/IQ"));
        assert_eq!(request.source_dir, PathBuf::from("/tmp/dl"));
        assert!(!request.backup_requested);
        assert!(!request.proceed_with_copy);
    }
}
