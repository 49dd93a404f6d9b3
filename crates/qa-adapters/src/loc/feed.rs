//! Flattening of `id.loc.gov` search feeds.
//!
//! The JSON rendering of the search feed mirrors the Atom XML element tree:
//! each element is an array of `[name, attributes, children...]`. Entries
//! look like:
//!
//! ```json
//! ["atom:entry",
//!   ["atom:title", {}, "Twain, Mark, 1835-1910"],
//!   ["atom:link", {"rel": "alternate", "href": "http://id.loc.gov/authorities/names/n79021164"}],
//!   ["atom:id", {}, "info:lc/authorities/names/n79021164"]]
//! ```

use serde_json::{Value, json};

const ENTRY: &str = "atom:entry";
const TITLE: &str = "atom:title";
const ID: &str = "atom:id";
const LINK: &str = "atom:link";

/// Flattens a search feed into `{id, label, uri}` records.
///
/// Returns `None` when the body is not a feed array.
pub(super) fn flatten(body: &Value) -> Option<Vec<Value>> {
    let elements = body.as_array()?;
    Some(
        elements
            .iter()
            .filter_map(Value::as_array)
            .filter(|element| name_of(element) == Some(ENTRY))
            .map(|entry| entry_record(entry.as_slice()))
            .collect(),
    )
}

fn entry_record(entry: &[Value]) -> Value {
    let mut id = None;
    let mut label = None;
    let mut uri = None;
    for part in entry.iter().filter_map(Value::as_array) {
        match name_of(part) {
            Some(TITLE) => label = text_of(part),
            Some(ID) => id = text_of(part),
            Some(LINK) if uri.is_none() => uri = href_of(part),
            _ => {}
        }
    }
    let link = uri.unwrap_or_default();
    json!({
        "id": id.unwrap_or_else(|| link.clone()),
        "label": label.unwrap_or_default(),
        "uri": link,
    })
}

fn name_of(element: &[Value]) -> Option<&str> {
    element.first().and_then(Value::as_str)
}

fn text_of(element: &[Value]) -> Option<String> {
    element.get(2).and_then(Value::as_str).map(str::to_owned)
}

fn href_of(element: &[Value]) -> Option<String> {
    let attributes = element.get(1)?.as_object()?;
    let alternate = attributes
        .get("rel")
        .and_then(Value::as_str)
        .is_none_or(|rel| rel == "alternate");
    if !alternate {
        return None;
    }
    attributes
        .get("href")
        .and_then(Value::as_str)
        .map(str::to_owned)
}
