//! `hourglass` command-line entry point.

use clap::Parser;
use hourglass::{cli::Cli, telemetry};
use std::io::Write;
use std::process::ExitCode;
use tokio::runtime::Builder;

fn main() -> ExitCode {
    telemetry::init();
    let cli = Cli::parse();
    let runtime = match Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => return fail(&err),
    };
    match runtime.block_on(hourglass::cli::run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(&err),
    }
}

fn fail(err: &dyn std::error::Error) -> ExitCode {
    tracing::error!(error = %err, "command failed");
    let mut stderr = std::io::stderr().lock();
    if writeln!(stderr, "hourglass: {err}").is_err() {
        return ExitCode::from(2);
    }
    ExitCode::FAILURE
}
