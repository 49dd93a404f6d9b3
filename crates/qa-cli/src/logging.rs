//! Log output formats.
//!
//! `auto` picks the format from where stderr goes: compact lines for a
//! terminal, JSON events when redirected into a file or pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Log output format as configured.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Compact when stderr is a terminal, JSON otherwise.
    #[default]
    Auto,
    /// One JSON object per event.
    Json,
    /// Single-line human-readable events.
    Compact,
}

/// Log format after `auto` has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolvedLogFormat {
    Json,
    Compact,
}

impl LogFormat {
    /// Resolves `auto` against whether stderr is a terminal.
    pub(crate) const fn resolve(self, stderr_is_terminal: bool) -> ResolvedLogFormat {
        match self {
            Self::Auto if stderr_is_terminal => ResolvedLogFormat::Compact,
            Self::Auto | Self::Json => ResolvedLogFormat::Json,
            Self::Compact => ResolvedLogFormat::Compact,
        }
    }
}
