use clap::Parser;
use colored::Colorize;
use organize_downloads::cli::{Args, run_cli_with_config, validate_target};
use organize_downloads::logging::init_logging;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    let target = match args.target_folder() {
        Ok(path) => path,
        Err(e) => return fail(&e.to_string()),
    };

    // The log file lives inside the target folder, so validate first.
    if let Err(e) = validate_target(&target) {
        return fail(&e.to_string());
    }

    init_logging(&target, args.verbose);

    // Run errors are already logged; only usage errors change the status.
    match run_cli_with_config(args.command(), &target, args.config.as_deref()) {
        Err(e) if e.is_usage_error() => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

fn fail(message: &str) -> ExitCode {
    eprintln!("{} {}", "Error:".red().bold(), message);
    ExitCode::FAILURE
}
