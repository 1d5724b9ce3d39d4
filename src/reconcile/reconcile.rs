//! Keyed collection reconciliation.

use super::{validate_no_duplicates, ReconcileError};
use crate::action::{Action, FieldAction};
use crate::element::{keys_of, present, Element};
use std::collections::HashSet;
use tracing::trace;

/// Computes the actions that turn the `old` collection into the `new` one.
///
/// Actions are emitted in this order:
///
/// 1. `Remove` for every old element whose key is gone, in old order.
/// 2. `FieldUpdate` for every matched element whose `match_compare` result is
///    not empty, in old order.
/// 3. `Add` for every new element whose key is unknown, in new order.
/// 4. At most one `Reorder`, when the desired order is not the natural one.
///
/// A `new` of `None` unsets the collection and removes every old element.
///
/// Interleaving of steps 1 and 2 follows old order; [`crate::sequence`]
/// imposes the final precedence across collections.
pub fn reconcile<F>(
    old: &[Option<Element>],
    new: Option<&[Option<Element>]>,
    mut match_compare: F,
) -> Result<Vec<Action>, ReconcileError>
where
    F: FnMut(&Element, &Element) -> Result<Vec<FieldAction>, ReconcileError>,
{
    let Some(new) = new else {
        return Ok(present(old).map(|element| Action::remove(element.key())).collect());
    };

    let new_by_key = validate_no_duplicates(new)?;
    let mut actions = Vec::new();

    for old_element in present(old) {
        match new_by_key.get(old_element.key()) {
            None => actions.push(Action::remove(old_element.key())),
            Some(new_element) => {
                if !old_element.type_tag.is_compatible_with(&new_element.type_tag) {
                    return Err(ReconcileError::type_change_unsupported(old_element.key()));
                }
                let field_actions = match_compare(old_element, *new_element)?;
                if !field_actions.is_empty() {
                    actions.push(Action::field_update(old_element.key(), field_actions));
                }
            }
        }
    }

    let old_keys: HashSet<&str> = present(old).map(Element::key).collect();
    actions.extend(
        present(new)
            .filter(|element| !old_keys.contains(element.key()))
            .map(|element| Action::add(element.clone())),
    );

    if let Some(reorder) = build_reorder_action(old, new) {
        actions.push(reorder);
    }

    trace!(
        old = old_keys.len(),
        new = new_by_key.len(),
        actions = actions.len(),
        "reconciled keyed collection"
    );

    Ok(actions)
}

/// Returns the order the collection ends up in without an explicit reorder.
///
/// That is the keys of old elements that survive, in old order, followed by
/// the keys of new-only elements, in new order. New elements can only be
/// appended at the end of a collection.
pub fn natural_order<'a>(old: &'a [Option<Element>], new: &'a [Option<Element>]) -> Vec<&'a str> {
    let new_keys: HashSet<&str> = present(new).map(Element::key).collect();
    let surviving: Vec<&str> = present(old)
        .map(Element::key)
        .filter(|key| new_keys.contains(key))
        .collect();
    let surviving_set: HashSet<&str> = surviving.iter().copied().collect();

    let mut order = surviving;
    order.extend(
        present(new)
            .map(Element::key)
            .filter(|key| !surviving_set.contains(key)),
    );
    order
}

/// Builds a reorder action when the natural order differs from the desired one.
pub fn build_reorder_action(old: &[Option<Element>], new: &[Option<Element>]) -> Option<Action> {
    let desired = keys_of(new);
    if natural_order(old, new) == desired {
        None
    } else {
        Some(Action::reorder(desired))
    }
}

/// A `match_compare` strategy that never reports field changes.
///
/// Useful for collections where only membership and order matter.
pub fn keys_only(_old: &Element, _new: &Element) -> Result<Vec<FieldAction>, ReconcileError> {
    Ok(Vec::new())
}
