//! Tests for keyed collection reconciliation.

#[cfg(test)]
mod tests {
    use crate::action::{Action, FieldAction};
    use crate::element::{collection, Collection, Element, TypeTag};
    use crate::reconcile::{
        build_reorder_action, keys_only, natural_order, reconcile, ReconcileError,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// Helper to create an element with a label payload.
    fn labeled(key: &str, label: &str) -> Element {
        Element::new(key).with_payload(json!({ "label": label }))
    }

    /// Helper to create a collection of payload-less elements.
    fn keys(keys: &[&str]) -> Collection {
        collection(keys.iter().map(|key| Element::new(*key)))
    }

    /// Compares the label field only.
    fn compare_label(old: &Element, new: &Element) -> Result<Vec<FieldAction>, ReconcileError> {
        let old_label = old.field("label");
        let new_label = new.field("label");
        if old_label == new_label {
            Ok(vec![])
        } else {
            Ok(vec![FieldAction::change(
                "label",
                new_label.cloned().unwrap_or_default(),
            )])
        }
    }

    #[test]
    fn test_unset_removes_all_in_old_order() {
        let old = keys(&["b", "a", "c"]);
        let actions = reconcile(&old, None, keys_only).unwrap();

        assert_eq!(
            actions,
            vec![Action::remove("b"), Action::remove("a"), Action::remove("c")]
        );
    }

    #[test]
    fn test_unset_skips_placeholders() {
        let old = vec![Some(Element::new("a")), None, Some(Element::new("b"))];
        let actions = reconcile(&old, None, keys_only).unwrap();

        assert_eq!(actions, vec![Action::remove("a"), Action::remove("b")]);
    }

    #[test]
    fn test_empty_new_removes_all_without_reorder() {
        let old = keys(&["a", "b"]);
        let new = keys(&[]);
        let actions = reconcile(&old, Some(&new), keys_only).unwrap();

        assert_eq!(actions, vec![Action::remove("a"), Action::remove("b")]);
    }

    #[test]
    fn test_empty_old_adds_all_without_reorder() {
        let old = keys(&[]);
        let new = keys(&["a", "b", "c"]);
        let actions = reconcile(&old, Some(&new), keys_only).unwrap();

        assert_eq!(
            actions,
            vec![
                Action::add(Element::new("a")),
                Action::add(Element::new("b")),
                Action::add(Element::new("c")),
            ]
        );
    }

    #[test]
    fn test_identical_collections_produce_nothing() {
        let old = collection(vec![labeled("a", "A"), labeled("b", "B")]);
        let actions = reconcile(&old, Some(&old), compare_label).unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn test_appended_elements_only_add() {
        let old = keys(&["a", "b"]);
        let new = keys(&["a", "b", "c", "d"]);
        let actions = reconcile(&old, Some(&new), keys_only).unwrap();

        assert_eq!(
            actions,
            vec![Action::add(Element::new("c")), Action::add(Element::new("d"))]
        );
    }

    #[test]
    fn test_rotation_emits_single_reorder() {
        let old = keys(&["a", "b", "c"]);
        let new = keys(&["c", "a", "b"]);
        let actions = reconcile(&old, Some(&new), keys_only).unwrap();

        assert_eq!(actions, vec![Action::reorder(["c", "a", "b"])]);
    }

    #[test]
    fn test_worked_scenario_has_no_reorder() {
        let old = collection(vec![labeled("a", "L1"), labeled("b", "L2")]);
        let new = collection(vec![labeled("b", "L2-new"), labeled("c", "L3")]);
        let actions = reconcile(&old, Some(&new), compare_label).unwrap();

        assert_eq!(
            actions,
            vec![
                Action::remove("a"),
                Action::field_update("b", vec![FieldAction::change("label", json!("L2-new"))]),
                Action::add(labeled("c", "L3")),
            ]
        );
    }

    #[test]
    fn test_insert_before_existing_needs_reorder() {
        let old = keys(&["a", "b"]);
        let new = keys(&["a", "x", "b"]);
        let actions = reconcile(&old, Some(&new), keys_only).unwrap();

        assert_eq!(
            actions,
            vec![
                Action::add(Element::new("x")),
                Action::reorder(["a", "x", "b"]),
            ]
        );
    }

    #[test]
    fn test_remove_and_reorder() {
        let old = keys(&["a", "b", "c", "d"]);
        let new = keys(&["d", "b"]);
        let actions = reconcile(&old, Some(&new), keys_only).unwrap();

        assert_eq!(
            actions,
            vec![
                Action::remove("a"),
                Action::remove("c"),
                Action::reorder(["d", "b"]),
            ]
        );
    }

    #[test]
    fn test_removes_and_updates_follow_old_order() {
        let old = collection(vec![labeled("a", "A"), labeled("b", "B"), labeled("c", "C")]);
        let new = collection(vec![labeled("a", "A2"), labeled("c", "C2")]);
        let actions = reconcile(&old, Some(&new), compare_label).unwrap();

        assert_eq!(
            actions,
            vec![
                Action::field_update("a", vec![FieldAction::change("label", json!("A2"))]),
                Action::remove("b"),
                Action::field_update("c", vec![FieldAction::change("label", json!("C2"))]),
            ]
        );
    }

    #[test]
    fn test_duplicate_draft_key_fails() {
        let old = keys(&["a"]);
        let new = keys(&["a", "b", "a"]);

        assert_eq!(
            reconcile(&old, Some(&new), keys_only),
            Err(ReconcileError::duplicate_key("a"))
        );
    }

    #[test]
    fn test_duplicate_old_keys_are_not_validated() {
        let old = keys(&["a", "a"]);
        let new = keys(&["b"]);
        let actions = reconcile(&old, Some(&new), keys_only).unwrap();

        assert_eq!(
            actions,
            vec![
                Action::remove("a"),
                Action::remove("a"),
                Action::add(Element::new("b")),
            ]
        );
    }

    #[test]
    fn test_type_change_fails() {
        let old = collection(vec![Element::new("size").with_type(TypeTag::plain("number"))]);
        let new = collection(vec![Element::new("size").with_type(TypeTag::plain("text"))]);

        assert_eq!(
            reconcile(&old, Some(&new), keys_only),
            Err(ReconcileError::type_change_unsupported("size"))
        );
    }

    #[test]
    fn test_container_shape_change_is_compared() {
        let old = collection(vec![Element::new("tags")
            .with_type("set<text>".parse().unwrap())
            .with_payload(json!({"label": "Tags"}))]);
        let new = collection(vec![Element::new("tags")
            .with_type(TypeTag::plain("text"))
            .with_payload(json!({"label": "Tag"}))]);

        let actions = reconcile(&old, Some(&new), compare_label).unwrap();
        assert_eq!(
            actions,
            vec![Action::field_update("tags", vec![FieldAction::change("label", json!("Tag"))])]
        );
    }

    #[test]
    fn test_compare_error_propagates() {
        let old = keys(&["a"]);
        let new = keys(&["a"]);
        let result = reconcile(&old, Some(&new), |_, _| Err(ReconcileError::duplicate_key("nested")));

        assert_eq!(result, Err(ReconcileError::duplicate_key("nested")));
    }

    #[test]
    fn test_placeholders_are_filtered() {
        let old = vec![None, Some(Element::new("a")), Some(Element::new("b"))];
        let new = vec![Some(Element::new("b")), None, Some(Element::new("a")), None];
        let actions = reconcile(&old, Some(&new), keys_only).unwrap();

        assert_eq!(actions, vec![Action::reorder(["b", "a"])]);
    }

    #[test]
    fn test_natural_order() {
        let old = keys(&["a", "b", "c"]);
        let new = keys(&["d", "c", "a"]);

        assert_eq!(natural_order(&old, &new), vec!["a", "c", "d"]);
        assert_eq!(
            build_reorder_action(&old, &new),
            Some(Action::reorder(["d", "c", "a"]))
        );
        assert_eq!(build_reorder_action(&old, &keys(&["a", "c", "d"])), None);
    }
}
