//! YAML term lists shared by the local and table authorities.
//!
//! A term file holds a `terms:` sequence. Entries are either maps with an
//! `id` and a `term` (plus any extra keys) or bare strings, which serve as
//! both identifier and label:
//!
//! ```yaml
//! terms:
//!   - id: OH
//!     term: Ohio
//!     active: true
//!   - Ohio River
//! ```

use std::fs;
use std::path::Path;

use qa_authority::normalize::{FieldMapping, RawResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Key holding a term's identifier.
const ID_KEY: &str = "id";
/// Key holding a term's display label.
const TERM_KEY: &str = "term";

/// Errors raised while reading a term file.
#[derive(Debug, Error)]
pub enum TermFileError {
    /// The file could not be read.
    #[error("failed to read term file {path}: {source}")]
    Read {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid term list.
    #[error("failed to parse term file {path}: {message}")]
    Parse {
        /// Path that failed.
        path: String,
        /// Parser error description.
        message: String,
    },

    /// An entry has neither an `id` nor a `term`.
    #[error("entry {index} in {path} has neither an id nor a term")]
    Anonymous {
        /// Path that failed.
        path: String,
        /// Zero-based entry index.
        index: usize,
    },
}

#[derive(Debug, Deserialize)]
struct TermDocument {
    #[serde(default)]
    terms: Vec<TermEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TermEntry {
    Bare(String),
    Full(Map<String, Value>),
}

/// An ordered list of term records loaded from YAML.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermList {
    records: Vec<Map<String, Value>>,
}

impl TermList {
    /// Reads and parses the term file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`TermFileError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, TermFileError> {
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| TermFileError::Read {
            path: display.clone(),
            source,
        })?;
        Self::parse(&text, &display)
    }

    /// Parses term-file YAML. `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns a [`TermFileError`] if the text is not a valid term list.
    pub fn parse(text: &str, origin: &str) -> Result<Self, TermFileError> {
        let document: TermDocument =
            serde_saphyr::from_str(text).map_err(|error| TermFileError::Parse {
                path: origin.to_owned(),
                message: error.to_string(),
            })?;
        let records = document
            .terms
            .into_iter()
            .enumerate()
            .map(|(index, entry)| into_record(entry, origin, index))
            .collect::<Result<_, _>>()?;
        Ok(Self { records })
    }

    /// Returns the number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when the list holds no terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns every term as a raw result.
    #[must_use]
    pub fn all(&self) -> RawResult {
        Self::raw(self.records.iter())
    }

    /// Returns the terms whose label satisfies `matches`.
    #[must_use]
    pub fn filter(&self, matches: impl Fn(&str) -> bool) -> RawResult {
        Self::raw(
            self.records
                .iter()
                .filter(|record| label_of(record).is_some_and(&matches)),
        )
    }

    /// Returns the term with identifier `id`, if present.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<RawResult> {
        self.records
            .iter()
            .find(|record| record.get(ID_KEY).and_then(Value::as_str) == Some(id))
            .map(|record| RawResult::new(Value::Object(record.clone()), mapping()))
    }

    fn raw<'a>(records: impl Iterator<Item = &'a Map<String, Value>>) -> RawResult {
        RawResult::new(
            Value::Array(records.cloned().map(Value::Object).collect()),
            mapping(),
        )
    }
}

fn mapping() -> FieldMapping {
    FieldMapping::new([ID_KEY], [TERM_KEY])
}

fn label_of(record: &Map<String, Value>) -> Option<&str> {
    record.get(TERM_KEY).and_then(Value::as_str)
}

fn into_record(
    entry: TermEntry,
    origin: &str,
    index: usize,
) -> Result<Map<String, Value>, TermFileError> {
    let mut record = match entry {
        TermEntry::Bare(text) => {
            let mut record = Map::new();
            record.insert(ID_KEY.to_owned(), Value::String(text.clone()));
            record.insert(TERM_KEY.to_owned(), Value::String(text));
            return Ok(record);
        }
        TermEntry::Full(record) => record,
    };
    let id = record.get(ID_KEY).and_then(scalar);
    let term = record.get(TERM_KEY).and_then(scalar);
    match (id, term) {
        (None, None) => {
            return Err(TermFileError::Anonymous {
                path: origin.to_owned(),
                index,
            });
        }
        (Some(id), None) => {
            record.insert(TERM_KEY.to_owned(), Value::String(id));
        }
        (None, Some(term)) => {
            record.insert(ID_KEY.to_owned(), Value::String(term));
        }
        (Some(id), Some(term)) => {
            record.insert(ID_KEY.to_owned(), Value::String(id));
            record.insert(TERM_KEY.to_owned(), Value::String(term));
        }
    }
    Ok(record)
}

/// Renders YAML scalars (strings, numbers, booleans) as text.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
