use iq_setup::{cli, connector, logging, paths};
use std::process::ExitCode;

fn main() -> ExitCode {
    let _log = match logging::init(&logging::logs_dir(), "module-connector.log") {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };

    let args = match cli::parse_connect_args(std::env::args_os()) {
        Ok(args) => args,
        Err(err) => {
            tracing::warn!("invalid arguments");
            eprintln!("{err}");
            if let Ok(cwd) = paths::root_dir() {
                eprintln!(
                    "\nExample: module-connector \"{}\" \"{}\"",
                    paths::default_module_dir(&cwd).display(),
                    paths::default_host_app_dir(&cwd).display()
                );
            }
            return ExitCode::from(2);
        }
    };
    tracing::info!(
        module = %args.module_path.display(),
        slicer = %args.host_app_path.display(),
        "connecting module"
    );

    match connector::connect_path(&args.module_path, &args.host_app_path) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("connect failed: {err}");
            eprintln!("ERROR Connecting module to Slicer\n{err}");
            ExitCode::FAILURE
        }
    }
}
