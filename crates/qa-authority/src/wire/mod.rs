//! Rendering of dispatch results into status codes and JSON bodies.
//!
//! The mapping mirrors what HTTP clients of the gateway expect: every
//! not-found outcome is a bare 404, while unsupported operations keep the
//! quirks clients rely on (`null` for list-all, `[]` for search).

use serde::Serialize;
use thiserror::Error;

use crate::capability::Operation;
use crate::dispatch::{DispatchResult, Payload};

/// HTTP status returned for data.
pub const STATUS_OK: u16 = 200;
/// HTTP status returned when no data is available.
pub const STATUS_NOT_FOUND: u16 = 404;

/// Errors raised while rendering a response body.
#[derive(Debug, Error)]
pub enum WireError {
    /// The payload could not be serialised to JSON.
    #[error("failed to serialise response body: {0}")]
    Serialise(#[from] serde_json::Error),
}

/// Status code and body of one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireResponse {
    status: u16,
    body: String,
}

impl WireResponse {
    fn ok(body: impl Into<String>) -> Self {
        Self {
            status: STATUS_OK,
            body: body.into(),
        }
    }

    const fn not_found() -> Self {
        Self {
            status: STATUS_NOT_FOUND,
            body: String::new(),
        }
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the response body. Empty for 404 responses.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns `true` when the status is 200.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Renders a dispatch result for the given operation.
///
/// # Errors
///
/// Returns [`WireError::Serialise`] if the payload cannot be encoded.
///
/// # Example
///
/// ```
/// use qa_authority::capability::Operation;
/// use qa_authority::dispatch::DispatchResult;
/// use qa_authority::wire::render;
///
/// let response = render(Operation::ListAll, &DispatchResult::Unsupported).expect("render");
/// assert_eq!(response.status(), 200);
/// assert_eq!(response.body(), "null");
/// ```
pub fn render(operation: Operation, result: &DispatchResult) -> Result<WireResponse, WireError> {
    match result {
        DispatchResult::Success(Payload::Terms(terms)) => {
            Ok(WireResponse::ok(serde_json::to_string(terms)?))
        }
        DispatchResult::Success(Payload::Term(term)) => {
            Ok(WireResponse::ok(serde_json::to_string(term)?))
        }
        DispatchResult::NotFound(_) => Ok(WireResponse::not_found()),
        DispatchResult::Unsupported => Ok(match operation {
            Operation::ListAll => WireResponse::ok("null"),
            Operation::Search => WireResponse::ok("[]"),
            Operation::FindById => WireResponse::not_found(),
        }),
    }
}
