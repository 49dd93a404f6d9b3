//! Normalisation of backend-specific result shapes into canonical terms.
//!
//! Adapters hand back a [`RawResult`]: the backend's JSON body plus the
//! [`FieldMapping`] describing where the identifier and label live. The
//! [`ResponseNormalizer`] applies the mapping, copying every unmapped field
//! into the term's attributes verbatim.

use serde_json::{Map, Value};

use crate::error::NormalizationError;
use crate::term::{AttributeValue, Term};

const SKOS_PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
const MADS_AUTHORITATIVE_LABEL: &str = "http://www.loc.gov/mads/rdf/v1#authoritativeLabel";

/// Describes where a backend keeps the canonical term fields.
///
/// Candidate keys are tried in order; the first key present with an
/// extractable value wins and is not copied into the attributes.
///
/// # Example
///
/// ```
/// use qa_authority::normalize::FieldMapping;
///
/// let mapping = FieldMapping::new(["idroot"], ["auth"]).with_records_at("/response/docs");
/// assert_eq!(mapping.records_pointer(), Some("/response/docs"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    id_keys: Vec<String>,
    label_keys: Vec<String>,
    records_pointer: Option<String>,
}

impl FieldMapping {
    /// Creates a mapping from ordered candidate keys.
    #[must_use]
    pub fn new<I, L, S, T>(id_keys: I, label_keys: L) -> Self
    where
        I: IntoIterator<Item = S>,
        L: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            id_keys: id_keys.into_iter().map(Into::into).collect(),
            label_keys: label_keys.into_iter().map(Into::into).collect(),
            records_pointer: None,
        }
    }

    /// Mapping for bodies that already use `id` and `label`.
    #[must_use]
    pub fn plain() -> Self {
        Self::new(["id"], ["label"])
    }

    /// Mapping for SKOS or MADS JSON-LD nodes.
    #[must_use]
    pub fn skos() -> Self {
        Self::new(
            ["@id", "uri"],
            [SKOS_PREF_LABEL, MADS_AUTHORITATIVE_LABEL, "prefLabel", "label"],
        )
    }

    /// Locates the record array at a JSON pointer inside the body.
    #[must_use]
    pub fn with_records_at(mut self, pointer: impl Into<String>) -> Self {
        self.records_pointer = Some(pointer.into());
        self
    }

    /// Returns the JSON pointer to the record array, if any.
    #[must_use]
    pub fn records_pointer(&self) -> Option<&str> {
        self.records_pointer.as_deref()
    }
}

/// Raw backend output awaiting normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResult {
    body: Value,
    mapping: FieldMapping,
}

impl RawResult {
    /// Pairs a backend body with the mapping that interprets it.
    #[must_use]
    pub const fn new(body: Value, mapping: FieldMapping) -> Self {
        Self { body, mapping }
    }

    /// Wraps a body that already uses `id` and `label`.
    #[must_use]
    pub fn plain(body: Value) -> Self {
        Self::new(body, FieldMapping::plain())
    }

    /// Returns the backend body.
    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Returns the field mapping.
    #[must_use]
    pub const fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }
}

/// Converts [`RawResult`] values into canonical [`Term`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseNormalizer;

impl ResponseNormalizer {
    /// Creates a normaliser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Normalises a sequence-shaped result (search and list-all).
    ///
    /// # Errors
    ///
    /// Returns [`NormalizationError`] if the record pointer does not resolve
    /// or the records are not an array of objects.
    pub fn normalize_many(&self, raw: &RawResult) -> Result<Vec<Term>, NormalizationError> {
        let records = locate(raw)?;
        let Value::Array(items) = records else {
            return Err(unexpected("an array of records", records));
        };
        items
            .iter()
            .map(|item| match item {
                Value::Object(fields) => Ok(to_term(fields, raw.mapping())),
                other => Err(unexpected("a record object", other)),
            })
            .collect()
    }

    /// Normalises a single-record result (find-by-id).
    ///
    /// A one-element array is accepted in place of a bare object.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizationError`] if the record pointer does not resolve
    /// or the body does not hold exactly one record object.
    pub fn normalize_one(&self, raw: &RawResult) -> Result<Term, NormalizationError> {
        let record = locate(raw)?;
        match record {
            Value::Object(fields) => Ok(to_term(fields, raw.mapping())),
            Value::Array(items) => match items.as_slice() {
                [Value::Object(fields)] => Ok(to_term(fields, raw.mapping())),
                _ => Err(unexpected("a single record", record)),
            },
            other => Err(unexpected("a record object", other)),
        }
    }
}

fn locate(raw: &RawResult) -> Result<&Value, NormalizationError> {
    match raw.mapping().records_pointer() {
        Some(pointer) => {
            raw.body()
                .pointer(pointer)
                .ok_or_else(|| NormalizationError::MissingRecords {
                    pointer: pointer.to_owned(),
                })
        }
        None => Ok(raw.body()),
    }
}

fn to_term(fields: &Map<String, Value>, mapping: &FieldMapping) -> Term {
    let id = take_first(fields, &mapping.id_keys);
    let label = take_first(fields, &mapping.label_keys);
    let consumed = [
        id.as_ref().map(|(key, _)| *key),
        label.as_ref().map(|(key, _)| *key),
    ];

    let mut term = Term::new(
        id.map(|(_, value)| value).unwrap_or_default(),
        label.map(|(_, value)| value).unwrap_or_default(),
    );
    for (key, value) in fields {
        if consumed.contains(&Some(key.as_str())) {
            continue;
        }
        if let Some(attribute) = attribute_value(value) {
            term.attributes_mut().insert(key.as_str(), attribute);
        }
    }
    term
}

fn take_first<'a>(fields: &Map<String, Value>, keys: &'a [String]) -> Option<(&'a str, String)> {
    keys.iter().find_map(|key| {
        fields
            .get(key)
            .and_then(scalar_text)
            .map(|text| (key.as_str(), text))
    })
}

/// Extracts a display string from a scalar, a JSON-LD value object, or the
/// first extractable element of an array.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Object(fields) => fields
            .get("@value")
            .or_else(|| fields.get("@id"))
            .and_then(scalar_text),
        Value::Array(items) => items.iter().find_map(scalar_text),
        Value::Null => None,
    }
}

fn attribute_value(value: &Value) -> Option<AttributeValue> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(AttributeValue::Text(text.clone())),
        Value::Array(items) => Some(AttributeValue::List(
            items
                .iter()
                .filter_map(|item| scalar_text(item).or_else(|| compact(item)))
                .collect(),
        )),
        Value::Object(_) => compact(value).map(AttributeValue::Text),
        Value::Number(_) | Value::Bool(_) => scalar_text(value).map(AttributeValue::Text),
    }
}

fn compact(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => serde_json::to_string(other).ok(),
    }
}

fn unexpected(expected: &'static str, found: &Value) -> NormalizationError {
    NormalizationError::UnexpectedShape {
        expected,
        found: shape_name(found),
    }
}

const fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
