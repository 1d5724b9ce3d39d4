//! Field-level comparison of element payloads.
//!
//! [`FieldComparator`] is the default `match_compare` strategy. It compares
//! object payloads one top-level field at a time and reconciles declared
//! keyed sub-collections recursively.

use crate::action::{Action, FieldAction};
use crate::element::{Collection, Element};
use crate::reconcile::{reconcile, ReconcileError};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// FieldComparator builds field actions for matched element pairs.
#[derive(Debug, Clone, Default)]
pub struct FieldComparator {
    nested: BTreeMap<String, FieldComparator>,
    ignored: BTreeSet<String>,
}

impl FieldComparator {
    /// Creates a comparator that compares every top-level field by value.
    pub fn new() -> Self {
        FieldComparator::default()
    }

    /// Declares `field` as a keyed sub-collection compared with a default comparator.
    pub fn nested(self, field: impl Into<String>) -> Self {
        self.nested_with(field, FieldComparator::new())
    }

    /// Declares `field` as a keyed sub-collection compared with `comparator`.
    pub fn nested_with(mut self, field: impl Into<String>, comparator: FieldComparator) -> Self {
        self.nested.insert(field.into(), comparator);
        self
    }

    /// Excludes `field` from comparison.
    pub fn ignored(mut self, field: impl Into<String>) -> Self {
        self.ignored.insert(field.into());
        self
    }

    /// Compares two matched elements.
    ///
    /// Fields are visited in lexical order. A field missing from the new
    /// payload is changed to `null`. A non-object payload is treated as a
    /// single unnamed field.
    pub fn compare(&self, old: &Element, new: &Element) -> Result<Vec<FieldAction>, ReconcileError> {
        let empty = Map::new();
        let (old_fields, new_fields) = match (&old.payload, &new.payload) {
            (Value::Object(o), Value::Object(n)) => (o, n),
            (Value::Null, Value::Object(n)) => (&empty, n),
            (Value::Object(o), Value::Null) => (o, &empty),
            (o, n) if o == n => return Ok(Vec::new()),
            (_, n) => return Ok(vec![FieldAction::change("", n.clone())]),
        };

        let names: BTreeSet<&String> = old_fields.keys().chain(new_fields.keys()).collect();
        let mut actions = Vec::new();

        for name in names {
            if self.ignored.contains(name.as_str()) {
                continue;
            }
            let old_value = old_fields.get(name.as_str());
            let new_value = new_fields.get(name.as_str());

            if let Some(comparator) = self.nested.get(name.as_str()) {
                let nested = comparator.compare_collection(new.key(), name, old_value, new_value)?;
                actions.extend(nested.into_iter().map(|action| FieldAction::nested(name.as_str(), action)));
                continue;
            }

            if old_value != new_value {
                actions.push(FieldAction::change(
                    name.as_str(),
                    new_value.cloned().unwrap_or(Value::Null),
                ));
            }
        }

        Ok(actions)
    }

    fn compare_collection(
        &self,
        key: &str,
        field: &str,
        old: Option<&Value>,
        new: Option<&Value>,
    ) -> Result<Vec<Action>, ReconcileError> {
        let old = parse_collection(key, field, old)?;
        let new = match new {
            None | Some(Value::Null) => None,
            Some(value) => Some(parse_collection(key, field, Some(value))?),
        };
        tracing::trace!(key, field, "reconciling nested collection");
        reconcile(&old, new.as_deref(), |o, n| self.compare(o, n))
    }
}

/// Parses a JSON array into a collection.
///
/// An absent or null field is an empty collection and null items are
/// placeholders. Any other non-array value, or an item that is not a valid
/// element, fails with [`ReconcileError::InvalidElement`].
fn parse_collection(key: &str, field: &str, value: Option<&Value>) -> Result<Collection, ReconcileError> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ReconcileError::invalid_element(key, field, "expected an array")),
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Null => Ok(None),
            item => serde_json::from_value(item.clone()).map(Some).map_err(|e| {
                ReconcileError::invalid_element(key, field, format!("item {}: {}", index, e))
            }),
        })
        .collect()
}
