//! Pure edits over `&[CauseNode]`.
//!
//! Every edit clones the input forest and changes only the addressed node.
//!
//! Ids passed to `insert_root`/`insert_child` must be freshly generated; the
//! uniqueness invariant is checked by `validate_forest` at document and
//! persistence boundaries, not on every edit. Depth is checked on every
//! edit that can add a level.

use super::index::ParentIndex;
use super::{TreeError, TreeResult, MAX_CAUSE_DEPTH};
use crate::model::cause::CauseNode;
use crate::model::id::CauseId;
use crate::model::validation::ValidationError;
use std::collections::HashSet;

/// Depth-first pre-order iterator over a forest.
pub struct PreOrder<'a> {
    stack: Vec<&'a CauseNode>,
}

impl<'a> PreOrder<'a> {
    pub fn new(roots: &'a [CauseNode]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a CauseNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Returns the first node in pre-order whose id equals `id`.
pub fn find(roots: &[CauseNode], id: CauseId) -> Option<&CauseNode> {
    PreOrder::new(roots).find(|node| node.id == id)
}

/// Number of nodes in the forest, descendants included.
pub fn count(roots: &[CauseNode]) -> usize {
    PreOrder::new(roots).count()
}

/// All ids in pre-order.
pub fn collect_ids(roots: &[CauseNode]) -> Vec<CauseId> {
    PreOrder::new(roots).map(|node| node.id).collect()
}

/// Appends `node` as the last root.
pub fn insert_root(roots: &[CauseNode], node: CauseNode) -> Vec<CauseNode> {
    let mut next = roots.to_vec();
    next.push(node);
    next
}

/// Appends `node` as the last child of `parent_id`.
///
/// # Errors
/// - `CauseNotFound(parent_id)` when the parent does not exist anywhere in
///   the forest.
/// - `DepthExceeded` when `node` or its deepest descendant would land below
///   `MAX_CAUSE_DEPTH`.
pub fn insert_child(
    roots: &[CauseNode],
    parent_id: CauseId,
    node: CauseNode,
) -> TreeResult<Vec<CauseNode>> {
    let parent_level = level_of(roots, parent_id).ok_or(TreeError::CauseNotFound(parent_id))?;
    if parent_level + height(&node) > MAX_CAUSE_DEPTH {
        return Err(TreeError::DepthExceeded {
            cause_id: node.id,
            max: MAX_CAUSE_DEPTH,
        });
    }
    let mut next = roots.to_vec();
    let parent = find_mut(&mut next, parent_id).ok_or(TreeError::CauseNotFound(parent_id))?;
    parent.children.push(node);
    Ok(next)
}

/// Replaces name and notes of `id`; id and children stay untouched.
///
/// # Errors
/// - `CauseNotFound(id)` when the node does not exist.
pub fn rename(
    roots: &[CauseNode],
    id: CauseId,
    name: impl Into<String>,
    notes: Option<String>,
) -> TreeResult<Vec<CauseNode>> {
    let mut next = roots.to_vec();
    let node = find_mut(&mut next, id).ok_or(TreeError::CauseNotFound(id))?;
    node.name = name.into();
    node.notes = notes;
    Ok(next)
}

/// Removes `id` and its whole subtree wherever it occurs.
///
/// Removing an absent id returns a forest equal to the input.
pub fn remove(roots: &[CauseNode], id: CauseId) -> Vec<CauseNode> {
    roots
        .iter()
        .filter(|node| node.id != id)
        .map(|node| CauseNode {
            id: node.id,
            name: node.name.clone(),
            notes: node.notes.clone(),
            children: remove(&node.children, id),
        })
        .collect()
}

/// Detaches `id` and re-attaches it under `new_parent` (root level for
/// `None`) at sibling index `position`, clamped to the sibling count.
/// Missing `position` appends.
///
/// # Errors
/// - `CauseNotFound` when `id` or `new_parent` does not exist.
/// - `CycleDetected` when `new_parent` is `id` or one of its descendants.
/// - `DuplicateCauseId` when the input forest already violates uniqueness.
/// - `DepthExceeded` when the moved subtree would reach below
///   `MAX_CAUSE_DEPTH`.
pub fn move_cause(
    roots: &[CauseNode],
    id: CauseId,
    new_parent: Option<CauseId>,
    position: Option<usize>,
) -> TreeResult<Vec<CauseNode>> {
    let index = ParentIndex::build(roots)?;
    if !index.contains(id) {
        return Err(TreeError::CauseNotFound(id));
    }
    let mut top_level = 1;
    if let Some(parent_id) = new_parent {
        let parent_depth = index
            .depth(parent_id)
            .ok_or(TreeError::CauseNotFound(parent_id))?;
        if parent_id == id || index.is_ancestor(id, parent_id) {
            return Err(TreeError::CycleDetected {
                cause_id: id,
                parent_id,
            });
        }
        top_level = parent_depth + 2;
    }
    let subtree_height = find(roots, id).map_or(1, height);
    if top_level - 1 + subtree_height > MAX_CAUSE_DEPTH {
        return Err(TreeError::DepthExceeded {
            cause_id: id,
            max: MAX_CAUSE_DEPTH,
        });
    }

    let mut next = roots.to_vec();
    let node = take(&mut next, id).ok_or(TreeError::CauseNotFound(id))?;
    let siblings = match new_parent {
        Some(parent_id) => {
            &mut find_mut(&mut next, parent_id)
                .ok_or(TreeError::CauseNotFound(parent_id))?
                .children
        }
        None => &mut next,
    };
    let at = position.unwrap_or(siblings.len()).min(siblings.len());
    siblings.insert(at, node);
    Ok(next)
}

/// Checks id uniqueness, non-blank names and the depth limit over the whole
/// forest.
pub fn validate_forest(roots: &[CauseNode]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    let mut stack: Vec<(&CauseNode, usize)> = roots.iter().rev().map(|node| (node, 1)).collect();
    while let Some((node, level)) = stack.pop() {
        if level > MAX_CAUSE_DEPTH {
            return Err(ValidationError::DepthExceeded {
                max: MAX_CAUSE_DEPTH,
            });
        }
        if !seen.insert(node.id) {
            return Err(ValidationError::DuplicateCauseId(node.id));
        }
        if node.name.trim().is_empty() {
            return Err(ValidationError::BlankCauseName);
        }
        stack.extend(node.children.iter().rev().map(|child| (child, level + 1)));
    }
    Ok(())
}

/// Levels spanned by `node` and its descendants; a leaf spans 1.
pub fn height(node: &CauseNode) -> usize {
    1 + node.children.iter().map(height).max().unwrap_or(0)
}

/// Level of the first node in pre-order with `id`; roots sit at level 1.
fn level_of(roots: &[CauseNode], id: CauseId) -> Option<usize> {
    let mut stack: Vec<(&CauseNode, usize)> = roots.iter().rev().map(|node| (node, 1)).collect();
    while let Some((node, level)) = stack.pop() {
        if node.id == id {
            return Some(level);
        }
        stack.extend(node.children.iter().rev().map(|child| (child, level + 1)));
    }
    None
}

fn find_mut(roots: &mut [CauseNode], id: CauseId) -> Option<&mut CauseNode> {
    for node in roots.iter_mut() {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn take(roots: &mut Vec<CauseNode>, id: CauseId) -> Option<CauseNode> {
    if let Some(position) = roots.iter().position(|node| node.id == id) {
        return Some(roots.remove(position));
    }
    roots.iter_mut().find_map(|node| take(&mut node.children, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::id::new_id;

    fn sample() -> Vec<CauseNode> {
        let review = CauseNode::leaf("Review", None).with_child(CauseNode::leaf("Time", None));
        vec![
            CauseNode::leaf("Method", None)
                .with_child(review)
                .with_child(CauseNode::leaf("Testing", None)),
            CauseNode::leaf("Machine", Some("tools".to_string())),
        ]
    }

    /// Single root with `levels` nested nodes beneath and including it.
    fn chain(levels: usize) -> CauseNode {
        (1..levels).fold(CauseNode::leaf("Level", None), |child, _| {
            CauseNode::leaf("Level", None).with_child(child)
        })
    }

    #[test]
    fn pre_order_visits_parent_before_children_and_keeps_sibling_order() {
        let forest = sample();
        let names: Vec<_> = PreOrder::new(&forest).map(|node| node.name.as_str()).collect();
        assert_eq!(names, ["Method", "Review", "Time", "Testing", "Machine"]);
    }

    #[test]
    fn find_reaches_deepest_descendant() {
        let forest = sample();
        let deep = forest[0].children[0].children[0].id;
        assert_eq!(find(&forest, deep).map(|node| node.name.as_str()), Some("Time"));
        assert!(find(&forest, new_id()).is_none());
    }

    #[test]
    fn insert_child_leaves_input_untouched() {
        let forest = sample();
        let before = forest.clone();
        let parent = forest[1].id;
        let next = insert_child(&forest, parent, CauseNode::leaf("Wear", None))
            .expect("machine exists");
        assert_eq!(forest, before);
        assert_eq!(next[1].children.len(), 1);
        assert_eq!(next[1].children[0].name, "Wear");
    }

    #[test]
    fn rename_keeps_children_and_id() {
        let forest = sample();
        let target = forest[0].id;
        let next = rename(&forest, target, "Process", Some("how work is done".into()))
            .expect("method exists");
        assert_eq!(next[0].id, target);
        assert_eq!(next[0].name, "Process");
        assert_eq!(next[0].notes.as_deref(), Some("how work is done"));
        assert_eq!(next[0].children, forest[0].children);
    }

    #[test]
    fn remove_nested_node_shrinks_parent_by_one() {
        let forest = sample();
        let review = forest[0].children[0].id;
        let next = remove(&forest, review);
        assert_eq!(next[0].children.len(), 1);
        assert_eq!(next[0].children[0].name, "Testing");
        assert_eq!(count(&next), 3);
    }

    #[test]
    fn move_cause_reparents_subtree_at_position() {
        let forest = sample();
        let review = forest[0].children[0].id;
        let machine = forest[1].id;
        let next =
            move_cause(&forest, review, Some(machine), Some(0)).expect("move under machine");
        assert_eq!(next[0].children.len(), 1);
        assert_eq!(next[1].children[0].id, review);
        assert_eq!(next[1].children[0].children.len(), 1);
        assert_eq!(count(&next), count(&forest));
    }

    #[test]
    fn move_cause_to_root_clamps_position() {
        let forest = sample();
        let testing = forest[0].children[1].id;
        let next = move_cause(&forest, testing, None, Some(99)).expect("move to root");
        assert_eq!(next.len(), 3);
        assert_eq!(next[2].id, testing);
    }

    #[test]
    fn move_cause_rejects_cycles() {
        let forest = sample();
        let method = forest[0].id;
        let time = forest[0].children[0].children[0].id;
        let err =
            move_cause(&forest, method, Some(time), None).expect_err("cycle through descendant");
        assert_eq!(
            err,
            TreeError::CycleDetected {
                cause_id: method,
                parent_id: time
            }
        );
        let err = move_cause(&forest, method, Some(method), None).expect_err("cycle through self");
        assert!(matches!(err, TreeError::CycleDetected { .. }));
    }

    #[test]
    fn validate_forest_flags_duplicate_ids_and_blank_names() {
        let mut forest = sample();
        assert_eq!(validate_forest(&forest), Ok(()));

        let duplicate = forest[0].id;
        forest[1].children.push(CauseNode::with_id(duplicate, "Copy", None));
        assert_eq!(
            validate_forest(&forest),
            Err(ValidationError::DuplicateCauseId(duplicate))
        );

        let blank = vec![CauseNode::leaf("  ", None)];
        assert_eq!(validate_forest(&blank), Err(ValidationError::BlankCauseName));
    }

    #[test]
    fn height_counts_levels_of_the_deepest_branch() {
        let forest = sample();
        assert_eq!(height(&forest[0]), 3);
        assert_eq!(height(&forest[1]), 1);
        assert_eq!(height(&chain(MAX_CAUSE_DEPTH)), MAX_CAUSE_DEPTH);
    }

    #[test]
    fn insert_child_stops_at_the_depth_limit() {
        let forest = vec![chain(MAX_CAUSE_DEPTH - 1)];
        let mut deepest = &forest[0];
        while let Some(child) = deepest.children.first() {
            deepest = child;
        }
        let deepest_id = deepest.id;

        let next = insert_child(&forest, deepest_id, CauseNode::leaf("Last", None))
            .expect("last level is still allowed");
        assert_eq!(height(&next[0]), MAX_CAUSE_DEPTH);

        let new_deepest = find(&next, deepest_id).expect("parent kept").children[0].id;
        let too_deep = CauseNode::leaf("Too deep", None);
        let too_deep_id = too_deep.id;
        let err = insert_child(&next, new_deepest, too_deep).expect_err("one level too many");
        assert_eq!(
            err,
            TreeError::DepthExceeded {
                cause_id: too_deep_id,
                max: MAX_CAUSE_DEPTH
            }
        );
    }

    #[test]
    fn insert_child_counts_the_height_of_the_inserted_subtree() {
        let forest = vec![CauseNode::leaf("Method", None)];
        let parent = forest[0].id;
        let err = insert_child(&forest, parent, chain(MAX_CAUSE_DEPTH))
            .expect_err("subtree reaches one level too far");
        assert!(matches!(err, TreeError::DepthExceeded { .. }));
        insert_child(&forest, parent, chain(MAX_CAUSE_DEPTH - 1))
            .expect("subtree fits exactly");
    }

    #[test]
    fn move_cause_rejects_subtrees_that_would_nest_too_deep() {
        let deep = chain(MAX_CAUSE_DEPTH - 1);
        let deep_leaf = collect_ids(std::slice::from_ref(&deep))[MAX_CAUSE_DEPTH - 2];
        let branch = CauseNode::leaf("Method", None).with_child(CauseNode::leaf("Review", None));
        let branch_id = branch.id;
        let forest = vec![deep, branch];

        let err = move_cause(&forest, branch_id, Some(deep_leaf), None)
            .expect_err("branch would end one level too deep");
        assert_eq!(
            err,
            TreeError::DepthExceeded {
                cause_id: branch_id,
                max: MAX_CAUSE_DEPTH
            }
        );

        let leaf_id = forest[1].children[0].id;
        let next = move_cause(&forest, leaf_id, Some(deep_leaf), None)
            .expect("a single leaf still fits");
        assert_eq!(height(&next[0]), MAX_CAUSE_DEPTH);
    }

    #[test]
    fn validate_forest_rejects_forests_deeper_than_the_limit() {
        assert_eq!(validate_forest(&[chain(MAX_CAUSE_DEPTH)]), Ok(()));
        assert_eq!(
            validate_forest(&[chain(MAX_CAUSE_DEPTH + 1)]),
            Err(ValidationError::DepthExceeded {
                max: MAX_CAUSE_DEPTH
            })
        );
    }
}
