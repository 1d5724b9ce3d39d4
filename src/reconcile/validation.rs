//! Draft key uniqueness validation.

use super::ReconcileError;
use crate::element::{present, Element};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Indexes draft elements by key, rejecting repeated keys.
///
/// Fails with [`ReconcileError::DuplicateKey`] naming the first key that is
/// seen twice in iteration order. Null placeholders are skipped. Only drafts
/// are validated; persisted collections are trusted.
pub fn validate_no_duplicates(elements: &[Option<Element>]) -> Result<HashMap<&str, &Element>, ReconcileError> {
    let mut by_key = HashMap::with_capacity(elements.len());
    for element in present(elements) {
        match by_key.entry(element.key()) {
            Entry::Occupied(_) => return Err(ReconcileError::duplicate_key(element.key())),
            Entry::Vacant(slot) => {
                slot.insert(element);
            }
        }
    }
    Ok(by_key)
}
