//! OCLC FAST (Faceted Application of Subject Terminology) suggest service.
//!
//! FAST is autocomplete only: it supports search, never list-all. Each
//! sub-authority selects a suggest index on the service.

use qa_authority::adapter::{AuthorityAdapter, Search};
use qa_authority::capability::{Operation, OperationSet};
use qa_authority::descriptor::AuthorityDescriptor;
use qa_authority::normalize::RawResult;
use qa_authority::AuthorityError;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::fetch::{SharedFetcher, encode_query};

/// Registry identifier.
pub const IDENTIFIER: &str = "assign_fast";
/// Name used in diagnostics.
pub const QUALIFIED_NAME: &str = "AssignFast";

const BASE_URL: &str = "http://fast.oclc.org/searchfast/fastsuggest";
const ROWS: u32 = 20;
const FAST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::assign_fast");

/// Sub-authorities paired with their suggest index, in published order.
pub const INDEXES: [(&str, &str); 8] = [
    ("all", "suggestall"),
    ("personal", "suggest00"),
    ("corporate", "suggest10"),
    ("event", "suggest11"),
    ("uniform", "suggest30"),
    ("topical", "suggest50"),
    ("geographic", "suggest51"),
    ("form_genre", "suggest55"),
];

/// Returns the descriptor registered for FAST.
#[must_use]
pub fn descriptor() -> AuthorityDescriptor {
    AuthorityDescriptor::new(IDENTIFIER, OperationSet::empty().with(Operation::Search))
        .with_qualified_name(QUALIFIED_NAME)
        .with_required_subauthorities(INDEXES.iter().map(|(name, _)| *name))
}

/// Returns the suggest index for a sub-authority.
#[must_use]
pub fn index_for(subauthority: &str) -> Option<&'static str> {
    INDEXES
        .iter()
        .find(|(name, _)| *name == subauthority)
        .map(|(_, index)| *index)
}

/// Adapter bound to one FAST suggest index.
pub struct AssignFastAdapter {
    fetcher: SharedFetcher,
    index: &'static str,
}

impl AssignFastAdapter {
    /// Builds an adapter for `subauthority`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Construction`] if the sub-authority is
    /// missing or has no suggest index.
    pub fn new(fetcher: SharedFetcher, subauthority: Option<&str>) -> Result<Self, AuthorityError> {
        let index = subauthority
            .and_then(index_for)
            .ok_or_else(|| AuthorityError::Construction {
                authority: IDENTIFIER.to_owned(),
                message: format!("no suggest index for sub-authority {subauthority:?}"),
            })?;
        Ok(Self { fetcher, index })
    }

    /// Returns the suggest URL for `query`.
    #[must_use]
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{BASE_URL}?query={}&queryIndex={index}&queryReturn={index},idroot,auth,type&rows={ROWS}&suggest=autoSubject",
            encode_query(query),
            index = self.index,
        )
    }

    fn record(&self, doc: &Map<String, Value>) -> Value {
        let id = text(doc.get("idroot")).unwrap_or_default();
        let auth = text(doc.get("auth")).unwrap_or_default();
        let kind = text(doc.get("type")).unwrap_or_default();
        let label = match text(doc.get(self.index)) {
            Some(suggestion) if kind == "alt" => format!("{suggestion} USE {auth}"),
            _ => auth.clone(),
        };
        json!({ "id": id, "label": label, "auth": auth, "type": kind })
    }
}

impl Search for AssignFastAdapter {
    fn search(&self, query: &str) -> Result<RawResult, AuthorityError> {
        let url = self.search_url(query);
        debug!(target: FAST_TARGET, url, "fetching");
        let body = self
            .fetcher
            .get_json(&url)
            .map_err(|error| error.into_authority_error(IDENTIFIER))?;
        let docs = body
            .pointer("/response/docs")
            .and_then(Value::as_array)
            .ok_or_else(|| AuthorityError::MalformedResponse {
                authority: IDENTIFIER.to_owned(),
                message: String::from("suggest response has no /response/docs array"),
            })?;
        let records = docs
            .iter()
            .filter_map(Value::as_object)
            .map(|doc| self.record(doc))
            .collect();
        Ok(RawResult::plain(Value::Array(records)))
    }
}

impl AuthorityAdapter for AssignFastAdapter {
    fn searcher(&self) -> Option<&dyn Search> {
        Some(self)
    }
}

/// Suggest fields are strings or single-element arrays of strings.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => items.first().and_then(Value::as_str).map(str::to_owned),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
