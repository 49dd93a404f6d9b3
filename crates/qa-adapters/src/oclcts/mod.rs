//! OCLC Terminology Services, searched over SRU.
//!
//! The sub-authority names the terminology on the service (for example
//! `mesh`) and is passed through unchecked, but it must be present. Answers
//! are Zthes records inside an SRU envelope, decoded by [`zthes`].

use qa_authority::adapter::{AuthorityAdapter, Search};
use qa_authority::capability::{Operation, OperationSet};
use qa_authority::descriptor::AuthorityDescriptor;
use qa_authority::normalize::RawResult;
use qa_authority::AuthorityError;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::fetch::SharedFetcher;

pub mod zthes;

/// Registry identifier.
pub const IDENTIFIER: &str = "oclcts";

const BASE_URL: &str = "http://tspilot.oclc.org/";
const ZTHES_SCHEMA: &str = "http://zthes.z3950.org/xml/1.0/";
const MAXIMUM_RECORDS: &str = "10";
const OCLCTS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::oclcts");

/// Returns the descriptor registered for OCLC Terminology Services.
#[must_use]
pub fn descriptor() -> AuthorityDescriptor {
    AuthorityDescriptor::new(IDENTIFIER, OperationSet::empty().with(Operation::Search))
        .with_open_subauthorities()
}

/// Adapter bound to one hosted terminology.
pub struct OclctsAdapter {
    fetcher: SharedFetcher,
    terminology: String,
}

impl OclctsAdapter {
    /// Builds an adapter for the terminology named by `subauthority`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Construction`] if no terminology is named.
    pub fn new(fetcher: SharedFetcher, subauthority: Option<&str>) -> Result<Self, AuthorityError> {
        let terminology = subauthority
            .filter(|name| !name.is_empty())
            .ok_or_else(|| construction("a terminology sub-authority is required"))?;
        Ok(Self {
            fetcher,
            terminology: terminology.to_owned(),
        })
    }

    /// Returns the SRU `searchRetrieve` URL for headings starting with
    /// `query`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Construction`] if the URL cannot be built.
    pub fn search_url(&self, query: &str) -> Result<String, AuthorityError> {
        let mut url = Url::parse(BASE_URL).map_err(|error| construction(&error.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| construction("base URL cannot carry a path"))?
            .pop_if_empty()
            .push(&self.terminology)
            .push("");
        url.query_pairs_mut()
            .append_pair("query", &format!("oclcts.rootHeading exact \"{query}*\""))
            .append_pair("version", "1.1")
            .append_pair("operation", "searchRetrieve")
            .append_pair("recordSchema", ZTHES_SCHEMA)
            .append_pair("maximumRecords", MAXIMUM_RECORDS)
            .append_pair("startRecord", "1")
            .append_pair("recordPacking", "xml");
        Ok(url.into())
    }
}

impl Search for OclctsAdapter {
    fn search(&self, query: &str) -> Result<RawResult, AuthorityError> {
        let url = self.search_url(query)?;
        debug!(target: OCLCTS_TARGET, url = %url, "fetching");
        let body = self
            .fetcher
            .get_text(&url)
            .map_err(|error| error.into_authority_error(IDENTIFIER))?;
        let records = zthes::records(&body).map_err(|error| AuthorityError::MalformedResponse {
            authority: IDENTIFIER.to_owned(),
            message: error.to_string(),
        })?;
        Ok(RawResult::plain(Value::Array(records)))
    }
}

impl AuthorityAdapter for OclctsAdapter {
    fn searcher(&self) -> Option<&dyn Search> {
        Some(self)
    }
}

fn construction(message: &str) -> AuthorityError {
    AuthorityError::Construction {
        authority: IDENTIFIER.to_owned(),
        message: message.to_owned(),
    }
}

#[cfg(test)]
mod tests;
