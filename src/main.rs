//! Application entry point.
//!
//! Parses command-line arguments and delegates execution to [`runner::run`].

use std::io;
use std::process::ExitCode;

use mymake::executor::Sinks;
use mymake::{cli, runner};
use tracing::Level;
use tracing_subscriber::fmt;

fn main() -> ExitCode {
    let cli = match cli::parse_from(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };
    let max_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::ERROR
    };
    fmt()
        .with_max_level(max_level)
        .with_writer(io::stderr)
        .init();

    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr();
    let mut sinks = Sinks::new(&mut stdout, &mut stderr);
    match runner::run(&cli, &mut sinks) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            let chain = format!("{err:#}");
            tracing::error!(error = %chain, "runner failed");
            ExitCode::FAILURE
        }
    }
}
