//! Update action types.

use crate::element::Element;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Action is a single atomic update on a keyed collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Action {
    /// Removes the element with the given key.
    Remove { key: String },
    /// Updates fields of the element with the given key.
    FieldUpdate { key: String, actions: Vec<FieldAction> },
    /// Appends a new element at the end of the collection.
    Add { element: Element },
    /// Sets the complete order of the collection by key.
    Reorder { keys: Vec<String> },
}

/// ActionKind is the discriminator of an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    Remove,
    FieldUpdate,
    Add,
    Reorder,
}

impl Action {
    /// Creates a remove action.
    pub fn remove(key: impl Into<String>) -> Self {
        Action::Remove { key: key.into() }
    }

    /// Creates a field update action.
    pub fn field_update(key: impl Into<String>, actions: Vec<FieldAction>) -> Self {
        Action::FieldUpdate {
            key: key.into(),
            actions,
        }
    }

    /// Creates an add action.
    pub fn add(element: Element) -> Self {
        Action::Add { element }
    }

    /// Creates a reorder action.
    pub fn reorder<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Action::Reorder {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the kind of this action.
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Remove { .. } => ActionKind::Remove,
            Action::FieldUpdate { .. } => ActionKind::FieldUpdate,
            Action::Add { .. } => ActionKind::Add,
            Action::Reorder { .. } => ActionKind::Reorder,
        }
    }

    /// Returns the key of the element this action targets.
    ///
    /// Reorder targets the whole collection and has no key.
    pub fn key(&self) -> Option<&str> {
        match self {
            Action::Remove { key } | Action::FieldUpdate { key, .. } => Some(key),
            Action::Add { element } => Some(element.key()),
            Action::Reorder { .. } => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Remove { key } => write!(f, "remove '{}'", key),
            Action::FieldUpdate { key, actions } => {
                write!(f, "update '{}':", key)?;
                for action in actions {
                    write!(f, " {};", action)?;
                }
                Ok(())
            }
            Action::Add { element } => write!(f, "add {}", element),
            Action::Reorder { keys } => write!(f, "reorder [{}]", keys.join(", ")),
        }
    }
}

/// FieldAction is a sub-action of [`Action::FieldUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum FieldAction {
    /// Sets a payload field to a new value. `Null` unsets the field.
    Change { field: String, value: Value },
    /// An action on a keyed sub-collection nested inside the element.
    Nested {
        collection: String,
        action: Box<Action>,
    },
}

impl FieldAction {
    /// Creates a change action.
    pub fn change(field: impl Into<String>, value: Value) -> Self {
        FieldAction::Change {
            field: field.into(),
            value,
        }
    }

    /// Wraps an action on a nested collection.
    pub fn nested(collection: impl Into<String>, action: Action) -> Self {
        FieldAction::Nested {
            collection: collection.into(),
            action: Box::new(action),
        }
    }
}

impl fmt::Display for FieldAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldAction::Change { field, value } => write!(f, "set {} = {}", field, value),
            FieldAction::Nested { collection, action } => write!(f, "{}: {}", collection, action),
        }
    }
}
