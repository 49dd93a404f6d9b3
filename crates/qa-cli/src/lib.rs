//! Command-line front end for the vocabulary query gateway.
//!
//! `qa` loads layered configuration, installs telemetry, assembles the
//! built-in authority catalogue and dispatches exactly one request. The
//! rendered body goes to stdout; logs and diagnostics go to stderr.
//!
//! Configuration flags come first, then the command:
//! `qa --mesh-path mesh.yml list mesh`. The flags may also be set in a TOML
//! file or as `QA_*` environment variables.
//!
//! Exit codes: `0` when the gateway answers 200, `1` when it answers 404,
//! and `2` for usage, configuration or I/O failures.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use qa_adapters::{SharedFetcher, builtin_registry};
use qa_authority::diagnostics::TracingReporter;
use qa_authority::dispatch::DispatchEngine;
use qa_authority::wire::{WireResponse, render};
use tracing::{debug, info};

mod cli;
mod config;
mod errors;
mod http;
mod logging;
mod telemetry;

#[cfg(test)]
mod tests;

use cli::Cli;
pub use config::{Config, ConfigError};
use config::{ConfigLoader, OrthoConfigLoader, command_arguments, split_config_arguments};
use errors::AppError;
pub use http::ReqwestFetcher;
pub use logging::LogFormat;

const CLI_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::run");
const EXIT_NOT_FOUND: u8 = 1;
const EXIT_FAILURE: u8 = 2;
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--log-filter",
    "--log-format",
    "--timeout-secs",
    "--retry-attempts",
    "--namespace",
    "--local-dir",
    "--mesh-path",
    "--tgnlang-path",
];

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with(args, stdout, stderr, &OrthoConfigLoader, |config| {
        let fetcher: SharedFetcher =
            Arc::new(ReqwestFetcher::new(config.timeout()).map_err(AppError::HttpClient)?);
        Ok(fetcher)
    })
}

/// Runs the CLI with a caller-supplied configuration loader and transport.
fn run_with<I, W, E, L, F>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
    connect: F,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
    F: FnOnce(&Config) -> Result<SharedFetcher, AppError>,
{
    match execute(args, stdout, loader, connect) {
        Ok(response) if response.is_ok() => ExitCode::SUCCESS,
        Ok(_) => {
            let _ = writeln!(stderr, "not found");
            ExitCode::from(EXIT_NOT_FOUND)
        }
        Err(AppError::CliUsage(error)) => {
            let code = u8::try_from(error.exit_code()).unwrap_or(EXIT_FAILURE);
            if error.use_stderr() {
                let _ = write!(stderr, "{}", error.render());
            } else {
                let _ = write!(stdout, "{}", error.render());
            }
            ExitCode::from(code)
        }
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn execute<I, W, L, F>(
    args: I,
    stdout: &mut W,
    loader: &L,
    connect: F,
) -> Result<WireResponse, AppError>
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    L: ConfigLoader,
    F: FnOnce(&Config) -> Result<SharedFetcher, AppError>,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let cli = Cli::try_parse_from(command_arguments(&args, &split)).map_err(AppError::CliUsage)?;
    let config = loader.load(&split.config_arguments)?;
    let log_format = telemetry::initialise(&config)?;
    debug!(target: CLI_TARGET, ?log_format, "telemetry ready");

    let fetcher = connect(&config)?;
    let registry = builtin_registry(&config.catalog(), &fetcher)?;
    info!(
        target: CLI_TARGET,
        authorities = registry.len(),
        "authority catalogue ready"
    );

    let engine = DispatchEngine::new(&registry, TracingReporter).with_retry(config.retry_policy());
    let request = cli.command.to_request();
    let result = engine.dispatch(&request);
    let response = render(request.operation().kind(), &result)?;
    if response.is_ok() {
        writeln!(stdout, "{}", response.body())?;
    }
    Ok(response)
}
