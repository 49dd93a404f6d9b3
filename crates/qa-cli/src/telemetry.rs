//! Tracing subscriber installation for the CLI.
//!
//! Events go to stderr so stdout carries only response bodies. The
//! subscriber is layered: one `EnvFilter` in front of exactly one of the
//! JSON or compact formatters.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::Config;
use crate::logging::ResolvedLogFormat;

static TELEMETRY_GUARD: OnceCell<ResolvedLogFormat> = OnceCell::new();

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression is invalid.
    #[error("invalid log filter {filter:?}: {message}")]
    Filter {
        /// Expression as configured.
        filter: String,
        /// Parser error description.
        message: String,
    },
    /// The global subscriber could not be installed.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

/// Installs the global subscriber on first use and returns the format in
/// effect. Later calls keep the first installation.
///
/// # Errors
///
/// Returns a [`TelemetryError`] if the filter is invalid or another
/// subscriber is already installed.
pub(crate) fn initialise(config: &Config) -> Result<ResolvedLogFormat, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| {
            let format = config.log_format().resolve(io::stderr().is_terminal());
            install(config.log_filter(), format).map(|()| format)
        })
        .copied()
}

/// Parses a filter expression, keeping the expression in the error.
pub(crate) fn parse_filter(filter: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(filter).map_err(|error| TelemetryError::Filter {
        filter: filter.to_owned(),
        message: error.to_string(),
    })
}

fn install(filter: &str, format: ResolvedLogFormat) -> Result<(), TelemetryError> {
    let filter = parse_filter(filter)?;
    let ansi = format == ResolvedLogFormat::Compact && io::stderr().is_terminal();

    let json = (format == ResolvedLogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(true)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(io::stderr)
    });
    let compact = (format == ResolvedLogFormat::Compact).then(|| {
        fmt::layer()
            .compact()
            .with_target(true)
            .with_ansi(ansi)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(compact)
        .try_init()?;
    Ok(())
}
