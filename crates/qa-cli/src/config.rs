//! Layered configuration for the `qa` tool.
//!
//! [`Config`] is loaded by `ortho-config`: built-in defaults, then a TOML
//! file (`--config-path` or `QA_CONFIG_PATH`), then `QA_*` environment
//! variables, then the configuration flags that precede the command. The
//! helpers here split those leading flags off the argument list so `clap`
//! only sees the command tokens.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use qa_adapters::CatalogConfig;
use qa_authority::dispatch::RetryPolicy;
use qa_authority::registry::DEFAULT_NAMESPACE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::AppError;
use crate::logging::LogFormat;

/// Default tracing filter.
pub(crate) const DEFAULT_LOG_FILTER: &str = "info";
/// Default backend timeout in seconds.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default number of backend attempts.
pub(crate) const DEFAULT_RETRY_ATTEMPTS: u32 = 1;

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_owned()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_retry_attempts() -> u32 {
    DEFAULT_RETRY_ATTEMPTS
}

/// Errors raised when loaded values are out of range.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "QA")]
pub struct Config {
    /// Tracing filter expression, for example `qa_authority=debug`.
    #[serde(default = "default_log_filter")]
    #[ortho_config(default = default_log_filter())]
    log_filter: String,
    /// Log output format (`auto`, `json` or `compact`).
    #[serde(default)]
    #[ortho_config(default = LogFormat::Auto)]
    log_format: LogFormat,
    /// Backend request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    #[ortho_config(default = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
    /// Attempts made for transient backend failures.
    #[serde(default = "default_retry_attempts")]
    #[ortho_config(default = DEFAULT_RETRY_ATTEMPTS)]
    retry_attempts: u32,
    /// Namespace used to qualify authority names in diagnostics.
    #[serde(default = "default_namespace")]
    #[ortho_config(default = default_namespace())]
    namespace: String,
    /// Directory of local YAML vocabularies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    local_dir: Option<PathBuf>,
    /// MeSH term file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mesh_path: Option<PathBuf>,
    /// TGN languages term file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tgnlang_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            log_format: LogFormat::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            namespace: default_namespace(),
            local_dir: None,
            mesh_path: None,
            tgnlang_path: None,
        }
    }
}

impl Config {
    /// Checks values that every layer may set but none may leave invalid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(String::from(
                "timeout_secs must be at least 1",
            )));
        }
        if self.retry_attempts == 0 {
            return Err(ConfigError::Invalid(String::from(
                "retry_attempts must be at least 1",
            )));
        }
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::Invalid(String::from(
                "namespace must not be blank",
            )));
        }
        Ok(())
    }

    /// Returns the tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the configured log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the backend request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the retry policy for transient backend failures.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::attempts(self.retry_attempts)
    }

    /// Returns the catalogue configuration.
    #[must_use]
    pub fn catalog(&self) -> CatalogConfig {
        CatalogConfig {
            namespace: self.namespace.clone(),
            local_dir: self.local_dir.clone(),
            mesh_path: self.mesh_path.clone(),
            tgnlang_path: self.tgnlang_path.clone(),
        }
    }
}

pub(crate) trait ConfigLoader {
    /// Loads and validates configuration from the leading flag arguments.
    ///
    /// # Flag Ordering
    ///
    /// Configuration flags (listed in `CONFIG_CLI_FLAGS`) must appear before
    /// the command. Later occurrences are handed to `clap` and rejected there.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        let config =
            Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify_flag(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagAction::Stop;
    }
    let (flag, inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (text.as_ref(), false),
    };
    if super::CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Leading configuration arguments and where the command begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    /// Program name followed by every configuration flag and value.
    pub(crate) config_arguments: Vec<OsString>,
    /// Index of the first command token in the original arguments.
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut config_arguments = vec![program.clone()];
    let mut expecting_value = false;
    for argument in rest {
        if expecting_value {
            expecting_value = false;
        } else {
            match classify_flag(argument) {
                FlagAction::Include { needs_value } => expecting_value = needs_value,
                FlagAction::Stop => break,
            }
        }
        config_arguments.push(argument.clone());
    }

    let command_start = config_arguments.len();
    ConfigArgumentSplit {
        config_arguments,
        command_start,
    }
}

/// Returns the program name followed by the command tokens.
pub(crate) fn command_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    args.first()
        .into_iter()
        .chain(args.get(split.command_start..).into_iter().flatten())
        .cloned()
        .collect()
}
