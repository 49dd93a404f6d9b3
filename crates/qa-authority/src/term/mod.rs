//! Canonical term records returned by every authority.
//!
//! A [`Term`] always carries an `id` and a `label`; backend-specific extras
//! (alternate labels, URIs, record types) travel in [`Attributes`], which
//! keeps insertion order for rendering but ignores it for equality.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Value stored against an attribute key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// A single string value.
    Text(String),
    /// A sequence of string values.
    List(Vec<String>),
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::List(items) => items.serialize(serializer),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Insertion-ordered attribute map.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    entries: Vec<(String, AttributeValue)>,
}

impl Attributes {
    /// Creates an empty attribute map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts or replaces `key`; a replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        let name = key.into();
        let attribute = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = attribute,
            None => self.entries.push((name, attribute)),
        }
    }

    /// Looks up the value stored for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no attributes are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl Eq for Attributes {}

/// One normalised entry returned by an authority.
///
/// # Example
///
/// ```
/// use qa_authority::term::Term;
///
/// let term = Term::new("OH", "Ohio").with_attribute("active", "true");
/// let json = serde_json::to_string(&term).expect("serialise");
/// assert_eq!(json, r#"{"id":"OH","label":"Ohio","active":"true"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    id: String,
    label: String,
    attributes: Attributes,
}

impl Term {
    /// Creates a term with no attributes.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            attributes: Attributes::new(),
        }
    }

    /// Adds an attribute and returns the term.
    #[must_use]
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(key, value);
        self
    }

    /// Returns the backend-local identifier.
    #[must_use]
    pub const fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the display label.
    #[must_use]
    pub const fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the backend-specific attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Returns a mutable view of the attributes.
    pub const fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }
}

impl Serialize for Term {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("label", &self.label)?;
        for (key, value) in self.attributes.iter() {
            // Canonical fields win over same-named extras.
            if key != "id" && key != "label" {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}
