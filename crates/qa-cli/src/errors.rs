//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use qa_adapters::CatalogError;
use qa_authority::wire::WireError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(reqwest::Error),
    #[error("failed to assemble authority catalogue: {0}")]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Render(#[from] WireError),
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
}
