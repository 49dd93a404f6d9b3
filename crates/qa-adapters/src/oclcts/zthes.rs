//! Zthes term records inside an SRU `searchRetrieveResponse`.
//!
//! Only the preferred heading of each record is read: the `termId` and
//! `termName` directly under `Zthes/term`. Related terms nested in
//! `relation` elements are skipped. Element prefixes are ignored, so both
//! default-namespace and `srw:`-prefixed envelopes decode the same way.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde_json::{Value, json};
use thiserror::Error;

const TERM_ID: [&str; 3] = ["Zthes", "term", "termId"];
const TERM_NAME: [&str; 3] = ["Zthes", "term", "termName"];
const TERM: [&str; 2] = ["Zthes", "term"];
const DIAGNOSTIC: [&str; 2] = ["diagnostic", "message"];

/// Errors raised while decoding an SRU response.
#[derive(Debug, Error)]
pub enum ZthesError {
    /// The body is not well-formed XML.
    #[error("invalid SRU XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The service answered with an SRU diagnostic instead of records.
    #[error("SRU diagnostic: {0}")]
    Diagnostic(String),
}

#[derive(Default)]
struct Heading {
    id: String,
    name: String,
}

/// Decodes every record of an SRU response into `{id, label}` objects.
///
/// A record without a `termId` falls back to its `termName` as identifier;
/// one with neither is dropped.
///
/// # Errors
///
/// Returns a [`ZthesError`] if the XML is malformed, or if the service
/// reported a diagnostic and returned no records.
///
/// # Example
///
/// ```
/// use qa_adapters::oclcts::zthes::records;
///
/// let xml = "<searchRetrieveResponse><records><record><recordData>\
///     <Zthes><term><termId>D006331</termId><termName>Heart Diseases</termName></term></Zthes>\
///     </recordData></record></records></searchRetrieveResponse>";
/// let terms = records(xml).expect("valid SRU");
/// assert_eq!(terms, vec![serde_json::json!({ "id": "D006331", "label": "Heart Diseases" })]);
/// ```
pub fn records(xml: &str) -> Result<Vec<Value>, ZthesError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut current: Option<Heading> = None;
    let mut found = Vec::new();
    let mut diagnostic: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                path.push(String::from_utf8_lossy(start.local_name().as_ref()).into_owned());
                if ends_with(&path, &TERM) {
                    current = Some(Heading::default());
                }
            }
            Event::End(_) => {
                if ends_with(&path, &TERM)
                    && let Some(record) = current.take().and_then(Heading::into_record)
                {
                    found.push(record);
                }
                path.pop();
            }
            Event::Text(text) => {
                let value = text.unescape()?;
                if let Some(heading) = current.as_mut() {
                    if ends_with(&path, &TERM_ID) {
                        heading.id.push_str(&value);
                    } else if ends_with(&path, &TERM_NAME) {
                        heading.name.push_str(&value);
                    }
                }
                if ends_with(&path, &DIAGNOSTIC) && diagnostic.is_none() {
                    diagnostic = Some(value.into_owned());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match diagnostic {
        Some(message) if found.is_empty() => Err(ZthesError::Diagnostic(message)),
        _ => Ok(found),
    }
}

impl Heading {
    fn into_record(self) -> Option<Value> {
        match (self.id.is_empty(), self.name.is_empty()) {
            (true, true) => None,
            (true, false) => Some(json!({ "id": self.name, "label": self.name })),
            _ => Some(json!({ "id": self.id, "label": self.name })),
        }
    }
}

fn ends_with(path: &[String], suffix: &[&str]) -> bool {
    path.len() >= suffix.len()
        && path
            .iter()
            .rev()
            .zip(suffix.iter().rev())
            .all(|(element, expected)| element == expected)
}
