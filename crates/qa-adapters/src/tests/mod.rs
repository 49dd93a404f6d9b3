//! Crate-level test doubles, integration and BDD tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use crate::fetch::{FetchError, Fetcher};


/// Fetcher answering from fixed URL tables.
///
/// Unknown URLs answer HTTP 404. An unreachable stub fails every request
/// with a connection error.
pub(crate) struct StubFetcher {
    responses: HashMap<String, Value>,
    documents: HashMap<String, String>,
    unreachable: bool,
    requested: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self {
            responses: HashMap::new(),
            documents: HashMap::new(),
            unreachable: false,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::new()
        }
    }

    pub(crate) fn with(mut self, url: &str, body: Value) -> Self {
        self.responses.insert(url.to_owned(), body);
        self
    }

    pub(crate) fn with_text(mut self, url: &str, body: &str) -> Self {
        self.documents.insert(url.to_owned(), body.to_owned());
        self
    }

    pub(crate) fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StubFetcher {
    fn answer<T: Clone>(&self, table: &HashMap<String, T>, url: &str) -> Result<T, FetchError> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_owned());
        if self.unreachable {
            return Err(FetchError::Connection {
                url: url.to_owned(),
                message: String::from("connection refused"),
            });
        }
        table.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_owned(),
            status: 404,
        })
    }
}

impl Fetcher for StubFetcher {
    fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.answer(&self.responses, url)
    }

    fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.answer(&self.documents, url)
    }
}

#[test]
fn fetch_errors_classify_transience() {
    let authority = "loc";
    let timeout = FetchError::Timeout {
        url: "u".into(),
        timeout_secs: 5,
    };
    let server = FetchError::Status {
        url: "u".into(),
        status: 503,
    };
    let client = FetchError::Status {
        url: "u".into(),
        status: 404,
    };
    let decode = FetchError::Decode {
        url: "u".into(),
        message: "eof".into(),
    };
    assert!(timeout.into_authority_error(authority).is_transient());
    assert!(server.into_authority_error(authority).is_transient());
    assert!(!client.into_authority_error(authority).is_transient());
    assert!(!decode.into_authority_error(authority).is_transient());
}
