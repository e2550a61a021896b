use fishbone_core::tree::{
    collect_ids, count, decode_forest, encode_forest, find, insert_child, move_cause, remove,
    rename, ParentIndex, TreeError,
};
use fishbone_core::CauseNode;
use proptest::prelude::*;
use proptest::sample::Index;
use uuid::Uuid;

const NAME_PATTERN: &str = "[A-Za-z][A-Za-z ]{0,11}";
const NOTES_PATTERN: &str = "[a-z ]{1,16}";

fn node_strategy() -> impl Strategy<Value = CauseNode> {
    let leaf = (NAME_PATTERN, proptest::option::of(NOTES_PATTERN))
        .prop_map(|(name, notes)| CauseNode::with_id(Uuid::nil(), name, notes));
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            NAME_PATTERN,
            proptest::option::of(NOTES_PATTERN),
            proptest::collection::vec(inner, 0..4),
        )
            .prop_map(|(name, notes, children)| CauseNode {
                id: Uuid::nil(),
                name,
                notes,
                children,
            })
    })
}

// Generated shapes get sequential ids so uniqueness always holds.
fn forest_strategy() -> impl Strategy<Value = Vec<CauseNode>> {
    proptest::collection::vec(node_strategy(), 0..5).prop_map(|mut roots| {
        let mut next = 1u128;
        assign_ids(&mut roots, &mut next);
        roots
    })
}

fn assign_ids(nodes: &mut [CauseNode], next: &mut u128) {
    for node in nodes {
        node.id = Uuid::from_u128(*next);
        *next += 1;
        assign_ids(&mut node.children, next);
    }
}

fn absent_id() -> Uuid {
    Uuid::from_u128(u128::MAX)
}

proptest! {
    #[test]
    fn prop_remove_drops_the_whole_subtree(forest in forest_strategy(), pick in any::<Index>()) {
        let ids = collect_ids(&forest);
        prop_assume!(!ids.is_empty());
        let target = ids[pick.index(ids.len())];
        let subtree_ids = collect_ids(std::slice::from_ref(find(&forest, target).unwrap()));

        let next = remove(&forest, target);

        for id in &subtree_ids {
            prop_assert!(find(&next, *id).is_none());
        }
        prop_assert_eq!(count(&next), count(&forest) - subtree_ids.len());
    }

    #[test]
    fn prop_remove_of_absent_id_is_identity(forest in forest_strategy()) {
        prop_assert_eq!(remove(&forest, absent_id()), forest);
    }

    #[test]
    fn prop_insert_child_changes_nothing_else(
        forest in forest_strategy(),
        pick in any::<Index>(),
        name in NAME_PATTERN,
    ) {
        let ids = collect_ids(&forest);
        prop_assume!(!ids.is_empty());
        let parent_id = ids[pick.index(ids.len())];
        let child = CauseNode::with_id(absent_id(), name, None);

        let next = insert_child(&forest, parent_id, child.clone()).unwrap();

        let parent = find(&next, parent_id).unwrap();
        prop_assert_eq!(parent.children.last(), Some(&child));
        prop_assert_eq!(remove(&next, child.id), forest);
    }

    #[test]
    fn prop_document_round_trip_preserves_order_and_fields(forest in forest_strategy()) {
        let document = encode_forest(&forest).unwrap();
        prop_assert_eq!(decode_forest(&document).unwrap(), forest);
    }

    #[test]
    fn prop_rename_keeps_identity_and_children(
        forest in forest_strategy(),
        pick in any::<Index>(),
        name in NAME_PATTERN,
    ) {
        let ids = collect_ids(&forest);
        prop_assume!(!ids.is_empty());
        let target = ids[pick.index(ids.len())];
        let before = find(&forest, target).unwrap();

        let next = rename(&forest, target, name.clone(), None).unwrap();

        let after = find(&next, target).unwrap();
        prop_assert_eq!(&after.name, &name);
        prop_assert!(after.notes.is_none());
        prop_assert_eq!(&after.children, &before.children);
        prop_assert_eq!(collect_ids(&next), ids);
    }

    #[test]
    fn prop_move_to_root_keeps_every_node(forest in forest_strategy(), pick in any::<Index>()) {
        let ids = collect_ids(&forest);
        prop_assume!(!ids.is_empty());
        let target = ids[pick.index(ids.len())];
        let subtree = find(&forest, target).unwrap().clone();

        let next = move_cause(&forest, target, None, Some(0)).unwrap();

        prop_assert_eq!(&next[0], &subtree);
        prop_assert_eq!(count(&next), count(&forest));
        let index = ParentIndex::build(&next).unwrap();
        prop_assert_eq!(index.parent_of(target), Some(None));
    }
}

#[test]
fn rename_of_missing_id_is_not_found() {
    let forest = vec![CauseNode::leaf("Machine", None)];
    let missing = absent_id();

    let err = rename(&forest, missing, "Tools", None).unwrap_err();

    assert_eq!(err, TreeError::CauseNotFound(missing));
    assert_eq!(forest[0].name, "Machine");
}

#[test]
fn move_under_own_descendant_is_rejected() {
    let grandchild = CauseNode::leaf("Worn belts", None);
    let child = CauseNode::leaf("Maintenance", None).with_child(grandchild.clone());
    let root = CauseNode::leaf("Machine", None).with_child(child);
    let forest = vec![root.clone()];

    let err = move_cause(&forest, root.id, Some(grandchild.id), None).unwrap_err();

    assert_eq!(
        err,
        TreeError::CycleDetected {
            cause_id: root.id,
            parent_id: grandchild.id,
        }
    );
}

#[test]
fn move_position_is_clamped_to_sibling_count() {
    let a = CauseNode::leaf("A", None);
    let b = CauseNode::leaf("B", None);
    let c = CauseNode::leaf("C", None);
    let forest = vec![a.clone(), b, c];

    let next = move_cause(&forest, a.id, None, Some(99)).unwrap();

    let names: Vec<&str> = next.iter().map(|node| node.name.as_str()).collect();
    assert_eq!(names, vec!["B", "C", "A"]);
}
