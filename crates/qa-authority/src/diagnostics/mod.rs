//! Structured diagnostic events emitted by the dispatch engine.
//!
//! Each [`DiagnosticEvent`] carries every field of one warning at once and
//! renders the stable message text consumed by operators. Reporting is
//! write-only and infallible: a [`DiagnosticReporter`] must never fail the
//! request it describes.

use std::fmt;

use tracing::warn;

use crate::capability::Operation;

/// Tracing target for diagnostic warnings.
pub const DIAGNOSTICS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::diagnostics");

/// One warning raised while dispatching a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    /// The vocabulary identifier is not registered.
    UnknownAuthority {
        /// Identifier as requested.
        vocabulary_id: String,
        /// Namespaced name used in the message.
        qualified_name: String,
    },
    /// The sub-authority is not in the authority's legal list.
    UnknownSubauthority {
        /// Identifier as requested.
        vocabulary_id: String,
        /// Namespaced name used in the message.
        qualified_name: String,
        /// Sub-authority as requested.
        subauthority_id: String,
        /// Every legal sub-authority, in declared order.
        valid: Vec<String>,
    },
    /// The adapter failed to build, to reach its backend, or to produce
    /// usable output.
    BackendFailure {
        /// Identifier as requested.
        vocabulary_id: String,
        /// Namespaced name used in the message.
        qualified_name: String,
        /// Operation being dispatched.
        operation: Operation,
        /// Rendered backend error.
        detail: String,
    },
}

impl DiagnosticEvent {
    /// Returns a stable snake-case name for the event kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownAuthority { .. } => "unknown_authority",
            Self::UnknownSubauthority { .. } => "unknown_subauthority",
            Self::BackendFailure { .. } => "backend_failure",
        }
    }

    /// Returns the vocabulary identifier the event concerns.
    #[must_use]
    pub fn vocabulary_id(&self) -> &str {
        match self {
            Self::UnknownAuthority { vocabulary_id, .. }
            | Self::UnknownSubauthority { vocabulary_id, .. }
            | Self::BackendFailure { vocabulary_id, .. } => vocabulary_id,
        }
    }
}

impl fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAuthority { qualified_name, .. } => {
                write!(f, "Unable to initialize authority {qualified_name}")
            }
            Self::UnknownSubauthority {
                qualified_name,
                subauthority_id,
                valid,
                ..
            } => {
                write!(
                    f,
                    "Unable to initialize sub-authority {subauthority_id} for {qualified_name}. \
                     Valid sub-authorities are ["
                )?;
                for (index, name) in valid.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name:?}")?;
                }
                f.write_str("]")
            }
            Self::BackendFailure {
                qualified_name,
                operation,
                detail,
                ..
            } => write!(
                f,
                "Unable to complete {operation} for {qualified_name}: {detail}"
            ),
        }
    }
}

/// Sink for diagnostic events.
pub trait DiagnosticReporter {
    /// Records one warning. Implementations must not panic or block
    /// indefinitely.
    fn warn(&self, event: &DiagnosticEvent);
}

impl<R: DiagnosticReporter + ?Sized> DiagnosticReporter for &R {
    fn warn(&self, event: &DiagnosticEvent) {
        (**self).warn(event);
    }
}

/// Reporter that forwards events to `tracing` at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl DiagnosticReporter for TracingReporter {
    fn warn(&self, event: &DiagnosticEvent) {
        warn!(
            target: DIAGNOSTICS_TARGET,
            kind = event.kind(),
            vocabulary = event.vocabulary_id(),
            "{event}"
        );
    }
}

#[cfg(any(test, feature = "test-support"))]
mod recording {
    use std::sync::{Mutex, PoisonError};

    use super::{DiagnosticEvent, DiagnosticReporter};

    /// Reporter that keeps every event in memory for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingReporter {
        events: Mutex<Vec<DiagnosticEvent>>,
    }

    impl RecordingReporter {
        /// Creates an empty recorder.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Returns a snapshot of the recorded events.
        #[must_use]
        pub fn events(&self) -> Vec<DiagnosticEvent> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Returns the rendered messages of the recorded events.
        #[must_use]
        pub fn messages(&self) -> Vec<String> {
            self.events().iter().map(ToString::to_string).collect()
        }
    }

    impl DiagnosticReporter for RecordingReporter {
        fn warn(&self, event: &DiagnosticEvent) {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event.clone());
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use self::recording::RecordingReporter;
