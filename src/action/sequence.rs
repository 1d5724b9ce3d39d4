//! Deterministic ordering of update actions.
//!
//! The remote platform validates every action against the cumulative effect
//! of the actions before it in the same request. Stale elements are removed
//! first, surviving elements are updated next, new elements are appended after
//! that, and a collection reorder always comes last so that it only references
//! keys that exist.

use super::{Action, FieldAction};

/// Returns the precedence rank of a top-level action.
pub fn action_rank(action: &Action) -> u8 {
    match action {
        Action::Remove { .. } => 0,
        Action::FieldUpdate { .. } => 1,
        Action::Add { .. } => 2,
        Action::Reorder { .. } => 3,
    }
}

/// Returns the precedence rank of a sub-action inside a field update.
///
/// Plain field changes share the rank of nested field updates.
pub fn field_action_rank(action: &FieldAction) -> u8 {
    match action {
        FieldAction::Change { .. } => 1,
        FieldAction::Nested { action, .. } => action_rank(action),
    }
}

/// Sequences actions into a server-safe total order.
///
/// The sort is stable: actions of equal rank keep their emission order. Sub
/// actions of every field update are sequenced the same way, recursively.
pub fn sequence(mut actions: Vec<Action>) -> Vec<Action> {
    actions.sort_by_key(action_rank);
    for action in actions.iter_mut() {
        if let Action::FieldUpdate { actions: sub_actions, .. } = action {
            sequence_field_actions(sub_actions);
        }
    }
    actions
}

fn sequence_field_actions(actions: &mut [FieldAction]) {
    actions.sort_by_key(field_action_rank);
    for action in actions.iter_mut() {
        if let FieldAction::Nested { action, .. } = action {
            if let Action::FieldUpdate { actions: inner, .. } = action.as_mut() {
                sequence_field_actions(inner);
            }
        }
    }
}
