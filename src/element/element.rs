//! Keyed element values.

use super::TypeTag;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Element is a uniquely keyed member of an ordered collection.
///
/// The payload is opaque to the reconciler and only ever inspected by an
/// injected comparison strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub key: String,
    #[serde(default, rename = "type")]
    pub type_tag: TypeTag,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl Element {
    /// Creates an element with a `text` type tag and a null payload.
    pub fn new(key: impl Into<String>) -> Self {
        Element {
            key: key.into(),
            type_tag: TypeTag::default(),
            payload: Value::Null,
        }
    }

    /// Sets the type tag.
    pub fn with_type(mut self, type_tag: TypeTag) -> Self {
        self.type_tag = type_tag;
        self
    }

    /// Sets the payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Returns the element key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns a field of an object payload, if any.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.as_object().and_then(|obj| obj.get(name))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.key, self.type_tag)
    }
}

/// Collection is an ordered list of elements that may contain null placeholders.
///
/// Placeholders are dropped by every operation in this crate.
pub type Collection = Vec<Option<Element>>;

/// Returns the non-null elements of a collection, in order.
pub fn present(elements: &[Option<Element>]) -> impl Iterator<Item = &Element> {
    elements.iter().flatten()
}

/// Returns the keys of the non-null elements of a collection, in order.
pub fn keys_of(elements: &[Option<Element>]) -> Vec<&str> {
    present(elements).map(Element::key).collect()
}

/// Wraps every element as present.
pub fn collection<I>(elements: I) -> Collection
where
    I: IntoIterator<Item = Element>,
{
    elements.into_iter().map(Some).collect()
}
