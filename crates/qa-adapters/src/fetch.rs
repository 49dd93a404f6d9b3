//! Transport seam between adapters and remote backends.
//!
//! Adapters never talk HTTP directly. They hand a fully built URL to a
//! [`Fetcher`] and receive decoded JSON (or raw text for XML services),
//! which keeps every adapter deterministic under test.

use std::sync::Arc;

use qa_authority::AuthorityError;
use serde_json::Value;
use thiserror::Error;

/// Shared handle to the transport used by every remote adapter.
pub type SharedFetcher = Arc<dyn Fetcher>;

/// Fetches JSON documents from remote backends.
pub trait Fetcher: Send + Sync {
    /// Issues a GET request for `url` and decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the request fails, times out, answers with
    /// a non-success status, or returns a body that is not JSON.
    fn get_json(&self, url: &str) -> Result<Value, FetchError>;

    /// Issues a GET request for `url` and returns the body as text.
    ///
    /// Used by backends that answer with XML.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the request fails, times out, or answers
    /// with a non-success status.
    fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Errors raised by a [`Fetcher`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// The backend did not answer in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },

    /// The connection could not be established.
    #[error("could not connect to {url}: {message}")]
    Connection {
        /// Requested URL.
        url: String,
        /// Transport error description.
        message: String,
    },

    /// The backend answered with a non-success status.
    #[error("{url} answered with HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The body could not be decoded as JSON or text.
    #[error("{url} returned a body that could not be decoded: {message}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decoder error description.
        message: String,
    },
}

impl FetchError {
    /// Converts the transport error into the domain error for `authority`.
    ///
    /// Timeouts, connection failures and server-side (5xx) statuses are
    /// transient; everything else is a malformed response.
    #[must_use]
    pub fn into_authority_error(self, authority: &str) -> AuthorityError {
        match self {
            Self::Timeout { timeout_secs, .. } => AuthorityError::Timeout {
                authority: authority.to_owned(),
                timeout_secs,
            },
            Self::Connection { .. } => AuthorityError::Unreachable {
                authority: authority.to_owned(),
                message: self.to_string(),
                source: None,
            },
            Self::Status { status, .. } if status >= 500 => AuthorityError::Unreachable {
                authority: authority.to_owned(),
                message: self.to_string(),
                source: None,
            },
            Self::Status { .. } | Self::Decode { .. } => AuthorityError::MalformedResponse {
                authority: authority.to_owned(),
                message: self.to_string(),
            },
        }
    }
}

/// Percent-encodes a free-text query for use in a URL query string.
pub(crate) fn encode_query(query: &str) -> String {
    url::form_urlencoded::byte_serialize(query.as_bytes()).collect()
}
