//! Library of Congress linked-data authorities (`id.loc.gov`).
//!
//! Every request must name one of the published sub-authorities. The
//! sub-authority decides which URL family the request goes to: name and
//! subject authorities, general vocabularies, preservation vocabularies, or
//! datatypes.

use qa_authority::adapter::{AuthorityAdapter, FindById, Search};
use qa_authority::capability::{Operation, OperationSet};
use qa_authority::descriptor::AuthorityDescriptor;
use qa_authority::normalize::{FieldMapping, RawResult};
use qa_authority::AuthorityError;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::fetch::{FetchError, SharedFetcher, encode_query};

mod feed;

/// Registry identifier.
pub const IDENTIFIER: &str = "loc";

const BASE_URL: &str = "http://id.loc.gov";
const LOC_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::loc");

/// Sub-authorities in their published order.
pub const SUBAUTHORITIES: [&str; 42] = [
    "subjects",
    "names",
    "classification",
    "childrensSubjects",
    "genreForms",
    "performanceMediums",
    "graphicMaterials",
    "organizations",
    "relators",
    "countries",
    "ethnographicTerms",
    "geographicAreas",
    "languages",
    "iso639-1",
    "iso639-2",
    "iso639-5",
    "preservation",
    "actionsGranted",
    "agentType",
    "edtf",
    "contentLocationType",
    "copyrightStatus",
    "cryptographicHashFunctions",
    "environmentCharacteristic",
    "environmentPurpose",
    "eventRelatedAgentRole",
    "eventRelatedObjectRole",
    "eventType",
    "formatRegistryRole",
    "hardwareType",
    "inhibitorTarget",
    "inhibitorType",
    "objectCategory",
    "preservationLevelRole",
    "relationshipSubType",
    "relationshipType",
    "rightsBasis",
    "rightsRelatedAgentRole",
    "signatureEncoding",
    "signatureMethod",
    "softwareType",
    "storageMedium",
];

const AUTHORITIES: [&str; 6] = [
    "subjects",
    "names",
    "classification",
    "childrensSubjects",
    "genreForms",
    "performanceMediums",
];

const VOCABULARIES: [&str; 11] = [
    "graphicMaterials",
    "organizations",
    "relators",
    "countries",
    "ethnographicTerms",
    "geographicAreas",
    "languages",
    "iso639-1",
    "iso639-2",
    "iso639-5",
    "preservation",
];

const DATATYPES: [&str; 1] = ["edtf"];

/// Returns the descriptor registered for LOC.
#[must_use]
pub fn descriptor() -> AuthorityDescriptor {
    AuthorityDescriptor::new(
        IDENTIFIER,
        OperationSet::empty()
            .with(Operation::Search)
            .with(Operation::FindById),
    )
    .with_required_subauthorities(SUBAUTHORITIES)
}

/// Returns the `id.loc.gov` path prefix for a sub-authority.
///
/// # Example
///
/// ```
/// use qa_adapters::loc::path_for;
///
/// assert_eq!(path_for("names"), "authorities/names");
/// assert_eq!(path_for("relators"), "vocabulary/relators");
/// assert_eq!(path_for("eventType"), "vocabulary/preservation/eventType");
/// assert_eq!(path_for("edtf"), "datatypes/edtf");
/// ```
#[must_use]
pub fn path_for(subauthority: &str) -> String {
    if AUTHORITIES.contains(&subauthority) {
        format!("authorities/{subauthority}")
    } else if VOCABULARIES.contains(&subauthority) {
        format!("vocabulary/{subauthority}")
    } else if DATATYPES.contains(&subauthority) {
        format!("datatypes/{subauthority}")
    } else {
        format!("vocabulary/preservation/{subauthority}")
    }
}

/// Adapter bound to one LOC sub-authority.
pub struct LocAdapter {
    fetcher: SharedFetcher,
    path: String,
}

impl LocAdapter {
    /// Builds an adapter for `subauthority`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Construction`] if no sub-authority is given.
    pub fn new(fetcher: SharedFetcher, subauthority: Option<&str>) -> Result<Self, AuthorityError> {
        let name = subauthority.ok_or_else(|| AuthorityError::Construction {
            authority: IDENTIFIER.to_owned(),
            message: String::from("a sub-authority is required"),
        })?;
        Ok(Self {
            fetcher,
            path: path_for(name),
        })
    }

    /// Returns the search URL for `query`.
    #[must_use]
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{BASE_URL}/search/?q={}&q=cs:{BASE_URL}/{}&format=json",
            encode_query(query),
            self.path
        )
    }

    /// Returns the record URL for `id`.
    ///
    /// The identifier is escaped as a single path segment, so `/`, `?` and
    /// spaces cannot leave the sub-authority's path.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Construction`] if the URL cannot be built.
    pub fn find_url(&self, id: &str) -> Result<String, AuthorityError> {
        let mut url = Url::parse(BASE_URL).map_err(|error| invalid_url(&error.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid_url("base URL cannot carry a path"))?
            .extend(self.path.split('/'))
            .push(&format!("{id}.json"));
        Ok(url.into())
    }

    fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        debug!(target: LOC_TARGET, url, "fetching");
        self.fetcher.get_json(url)
    }
}

fn invalid_url(message: &str) -> AuthorityError {
    AuthorityError::Construction {
        authority: IDENTIFIER.to_owned(),
        message: format!("cannot build record URL: {message}"),
    }
}

impl Search for LocAdapter {
    fn search(&self, query: &str) -> Result<RawResult, AuthorityError> {
        let body = self
            .fetch(&self.search_url(query))
            .map_err(|error| error.into_authority_error(IDENTIFIER))?;
        let records = feed::flatten(&body).ok_or_else(|| AuthorityError::MalformedResponse {
            authority: IDENTIFIER.to_owned(),
            message: String::from("search response is not an atom feed"),
        })?;
        Ok(RawResult::plain(Value::Array(records)))
    }
}

impl FindById for LocAdapter {
    fn find(&self, id: &str) -> Result<RawResult, AuthorityError> {
        let missing = || AuthorityError::TermNotFound {
            authority: IDENTIFIER.to_owned(),
            id: id.to_owned(),
        };
        let body = match self.fetch(&self.find_url(id)?) {
            Ok(body) => body,
            Err(FetchError::Status { status: 404, .. }) => return Err(missing()),
            Err(error) => return Err(error.into_authority_error(IDENTIFIER)),
        };
        let node = select_node(&body, id).ok_or_else(missing)?;
        Ok(RawResult::new(Value::Object(node), FieldMapping::skos()))
    }
}

impl AuthorityAdapter for LocAdapter {
    fn searcher(&self) -> Option<&dyn Search> {
        Some(self)
    }

    fn finder(&self) -> Option<&dyn FindById> {
        Some(self)
    }
}

/// Picks the JSON-LD node describing `id` out of a record document.
///
/// Record documents are either a bare array of nodes or an object with an
/// `@graph` array. The node whose `@id` ends in `/<id>` wins; a lone node is
/// accepted as is.
fn select_node(body: &Value, id: &str) -> Option<Map<String, Value>> {
    let nodes = match body {
        Value::Array(nodes) => nodes.as_slice(),
        Value::Object(object) => match object.get("@graph") {
            Some(Value::Array(nodes)) => nodes.as_slice(),
            _ => return Some(object.clone()),
        },
        _ => return None,
    };
    let suffix = format!("/{id}");
    let mut objects = nodes.iter().filter_map(Value::as_object);
    let matching = nodes
        .iter()
        .filter_map(Value::as_object)
        .find(|node| {
            node.get("@id")
                .and_then(Value::as_str)
                .is_some_and(|node_id| node_id.ends_with(&suffix))
        })
        .cloned();
    matching.or_else(|| match (objects.next(), objects.next()) {
        (Some(only), None) => Some(only.clone()),
        _ => None,
    })
}
