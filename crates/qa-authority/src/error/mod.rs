//! Domain errors raised while registering and invoking authorities.
//!
//! All errors use `thiserror`-derived enums with structured context so the
//! dispatch engine can classify failures and render a single diagnostic
//! detail string. I/O errors are wrapped in `Arc` to satisfy the
//! `result_large_err` Clippy lint.

use std::sync::Arc;

use thiserror::Error;

use crate::capability::Operation;

/// Errors arising from authority registration and backend invocation.
#[derive(Debug, Error)]
pub enum AuthorityError {
    /// An authority descriptor failed validation.
    #[error("descriptor error: {message}")]
    Descriptor {
        /// Description of the validation failure.
        message: String,
    },

    /// An authority with the same identifier is already registered.
    #[error("authority '{identifier}' is already registered")]
    Duplicate {
        /// Identifier that was registered twice.
        identifier: String,
    },

    /// The adapter could not be constructed for the requested sub-authority.
    #[error("authority '{authority}' could not be constructed: {message}")]
    Construction {
        /// Authority identifier.
        authority: String,
        /// Human-readable failure description.
        message: String,
    },

    /// The remote backend could not be reached.
    #[error("backend for '{authority}' is unreachable: {message}")]
    Unreachable {
        /// Authority identifier.
        authority: String,
        /// Human-readable failure description.
        message: String,
        /// Optional underlying I/O error.
        #[source]
        source: Option<Arc<std::io::Error>>,
    },

    /// The remote backend did not answer within the configured timeout.
    #[error("backend for '{authority}' timed out after {timeout_secs}s")]
    Timeout {
        /// Authority identifier.
        authority: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },

    /// The backend answered with a body the adapter could not interpret.
    #[error("backend for '{authority}' returned a malformed response: {message}")]
    MalformedResponse {
        /// Authority identifier.
        authority: String,
        /// Description of the parse failure.
        message: String,
    },

    /// The adapter does not implement an operation its descriptor declares.
    #[error("authority '{authority}' declares {operation} but its adapter does not implement it")]
    MissingCapability {
        /// Authority identifier.
        authority: String,
        /// Operation that was declared but not implemented.
        operation: Operation,
    },

    /// A lookup by identifier found no record in the backend.
    #[error("authority '{authority}' has no term '{id}'")]
    TermNotFound {
        /// Authority identifier.
        authority: String,
        /// Identifier that was looked up.
        id: String,
    },

    /// The raw backend result could not be normalised into terms.
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
}

impl AuthorityError {
    /// Returns `true` when retrying the backend call may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::Timeout { .. })
    }
}

/// Errors raised while mapping a backend body onto canonical terms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    /// The configured record pointer did not resolve inside the body.
    #[error("record pointer '{pointer}' does not resolve in the backend response")]
    MissingRecords {
        /// JSON pointer that failed to resolve.
        pointer: String,
    },

    /// The body had a different JSON shape than the operation requires.
    #[error("expected {expected} in backend response, found {found}")]
    UnexpectedShape {
        /// Shape the normaliser required.
        expected: &'static str,
        /// Shape that was found.
        found: &'static str,
    },
}
