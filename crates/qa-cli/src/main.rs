//! CLI entrypoint for the `qa` vocabulary query tool.
//!
//! The binary delegates to [`qa_cli::run`], which loads configuration,
//! parses arguments, dispatches one request and writes the response body.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    qa_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
