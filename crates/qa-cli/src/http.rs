//! Blocking HTTP transport for remote authorities.

use std::time::Duration;

use qa_adapters::{FetchError, Fetcher};
use reqwest::blocking::{Client, Response};
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::debug;

const HTTP_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::http");
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// [`Fetcher`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout_secs: u64,
}

impl ReqwestFetcher {
    /// Builds a client that gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    fn classify(&self, url: &str, error: &reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.timeout_secs,
            }
        } else if error.is_decode() {
            FetchError::Decode {
                url: url.to_owned(),
                message: error.to_string(),
            }
        } else {
            FetchError::Connection {
                url: url.to_owned(),
                message: error.to_string(),
            }
        }
    }

    fn send(&self, url: &str, accept: &str) -> Result<Response, FetchError> {
        debug!(target: HTTP_TARGET, url, accept, "GET");
        let response = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .map_err(|error| self.classify(url, &error))?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(FetchError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            })
        }
    }
}

impl Fetcher for ReqwestFetcher {
    fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.send(url, "application/json")?
            .json::<Value>()
            .map_err(|error| self.classify(url, &error))
    }

    fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.send(url, "application/xml, text/xml")?
            .text()
            .map_err(|error| self.classify(url, &error))
    }
}
