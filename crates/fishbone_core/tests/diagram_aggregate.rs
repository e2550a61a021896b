use fishbone_core::model::id::new_id;
use fishbone_core::{
    default_categories, CategorySeed, CauseNode, Diagram, DiagramError, DiagramEdit, TreeError,
    ValidationError,
};

fn seeded(problem: &str) -> Diagram {
    Diagram::create(new_id(), problem, CategorySeed::Default).unwrap()
}

#[test]
fn seeded_diagram_has_six_leaf_categories() {
    let diagram = seeded("Too many bugs");

    let names: Vec<&str> = diagram.causes.iter().map(|node| node.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Materials", "Measurement", "Environment", "Method", "Machine", "People"]
    );
    assert!(diagram.causes.iter().all(CauseNode::is_leaf));
    assert!(diagram.causes.iter().all(|node| node.notes.is_some()));
    assert_eq!(diagram.problem, "Too many bugs");
}

#[test]
fn seeded_categories_get_fresh_ids_per_diagram() {
    let first = default_categories();
    let second = default_categories();
    for (left, right) in first.iter().zip(&second) {
        assert_eq!(left.name, right.name);
        assert_ne!(left.id, right.id);
    }
}

#[test]
fn add_sub_cause_under_method_touches_only_method() {
    let diagram = seeded("Too many bugs");
    let method_id = diagram.find_cause_by_name("Method").unwrap().id;

    let next = diagram
        .add_sub_cause(method_id, "Poor prioritization", None)
        .unwrap();

    let method = next.find_cause(method_id).unwrap();
    assert_eq!(method.children.len(), 1);
    assert_eq!(method.children[0].name, "Poor prioritization");
    for (before, after) in diagram.causes.iter().zip(&next.causes) {
        if before.id != method_id {
            assert_eq!(before, after);
        }
    }
    assert_eq!(next.causes.len(), 6);
}

#[test]
fn deleting_a_category_removes_its_subtree() {
    let diagram = seeded("Too many bugs");
    let method_id = diagram.find_cause_by_name("Method").unwrap().id;
    let diagram = diagram
        .add_sub_cause(method_id, "Poor prioritization", None)
        .unwrap()
        .add_sub_cause(method_id, "No code review", Some("since March"))
        .unwrap();
    let removed_ids: Vec<_> = std::iter::once(method_id)
        .chain(diagram.find_cause(method_id).unwrap().children.iter().map(|c| c.id))
        .collect();
    assert_eq!(removed_ids.len(), 3);

    let next = diagram.delete_cause(method_id);

    assert_eq!(next.causes.len(), 5);
    for id in removed_ids {
        assert!(next.find_cause(id).is_none());
    }
    assert_eq!(next.cause_count(), 5);
}

#[test]
fn deleting_a_missing_cause_is_a_no_op() {
    let diagram = seeded("Too many bugs");
    assert_eq!(diagram.delete_cause(new_id()), diagram);
}

#[test]
fn edit_cause_normalizes_and_keeps_children() {
    let diagram = seeded("Too many bugs");
    let machine_id = diagram.find_cause_by_name("Machine").unwrap().id;
    let diagram = diagram.add_sub_cause(machine_id, "Old servers", None).unwrap();

    let next = diagram
        .edit_cause(machine_id, "  Build   machines ", Some("\n"))
        .unwrap();

    let machine = next.find_cause(machine_id).unwrap();
    assert_eq!(machine.name, "Build machines");
    assert_eq!(machine.notes, None);
    assert_eq!(machine.children.len(), 1);
}

#[test]
fn move_cause_reparents_a_subtree() {
    let diagram = seeded("Too many bugs");
    let method_id = diagram.find_cause_by_name("Method").unwrap().id;
    let people_id = diagram.find_cause_by_name("People").unwrap().id;
    let diagram = diagram.add_sub_cause(method_id, "Training gaps", None).unwrap();
    let gaps_id = diagram.find_cause_by_name("Training gaps").unwrap().id;

    let next = diagram.move_cause(gaps_id, Some(people_id), None).unwrap();

    assert!(next.find_cause(method_id).unwrap().is_leaf());
    assert_eq!(next.find_cause(people_id).unwrap().children[0].id, gaps_id);
}

#[test]
fn custom_seed_with_duplicate_ids_is_rejected() {
    let node = CauseNode::leaf("Machine", None);
    let err = Diagram::create(
        new_id(),
        "Late deliveries",
        CategorySeed::Custom(vec![node.clone(), node.clone()]),
    )
    .unwrap_err();
    assert_eq!(
        err,
        DiagramError::Validation(ValidationError::DuplicateCauseId(node.id))
    );
}

#[test]
fn edits_apply_through_the_edit_enum() {
    let diagram = Diagram::create(new_id(), "Late deliveries", CategorySeed::Empty).unwrap();
    let next = DiagramEdit::AddCategory {
        name: "Suppliers".to_string(),
        notes: None,
    }
    .apply(&diagram)
    .unwrap();
    let supplier_id = next.causes[0].id;

    let missing = new_id();
    let err = DiagramEdit::EditCause {
        cause_id: missing,
        name: "Vendors".to_string(),
        notes: None,
    }
    .apply(&next)
    .unwrap_err();
    assert_eq!(err, DiagramError::Tree(TreeError::CauseNotFound(missing)));

    let renamed = DiagramEdit::EditCause {
        cause_id: supplier_id,
        name: "Vendors".to_string(),
        notes: Some("two late in Q3".to_string()),
    }
    .apply(&next)
    .unwrap();
    assert_eq!(renamed.causes[0].name, "Vendors");
    assert_eq!(renamed.revision, diagram.revision);
}

#[test]
fn edit_json_form_is_tagged_by_op() {
    let parent_id = new_id();
    let edit: DiagramEdit = serde_json::from_value(serde_json::json!({
        "op": "add_sub_cause",
        "parent_id": parent_id,
        "name": "Worn bearings",
    }))
    .unwrap();
    assert_eq!(
        edit,
        DiagramEdit::AddSubCause {
            parent_id,
            name: "Worn bearings".to_string(),
            notes: None,
        }
    );
}
