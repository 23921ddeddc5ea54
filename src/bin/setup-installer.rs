use chrono::Local;
use clap::Parser;
use iq_setup::{
    cli::InstallArgs,
    install::{self, InstallError},
    logging, paths,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = InstallArgs::parse();
    let _log = match logging::init(&logging::logs_dir(), "setup-installer.log") {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };

    let cwd = match paths::root_dir() {
        Ok(cwd) => cwd,
        Err(err) => {
            eprintln!("!!! ERROR !!! {err:#}");
            return ExitCode::FAILURE;
        }
    };
    let request = args.into_request(&cwd);
    tracing::info!(?request, "setup-installer {}", iq_setup::config::VERSION);

    let now = Local::now().naive_local();
    match install::plan_install(&request, now) {
        Ok(plan) => println!("{plan}\n"),
        Err(err) => return report_failure(err),
    }
    if !request.proceed_with_copy {
        println!("Dry run, nothing was changed.");
        return ExitCode::SUCCESS;
    }

    match install::install_at(&request, now) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => report_failure(err),
    }
}

fn report_failure(err: InstallError) -> ExitCode {
    tracing::error!("install failed: {err}");
    eprintln!("!!! ERROR !!! {err}");
    ExitCode::FAILURE
}
