//! Explicit id -> parent index for one forest snapshot.
//!
//! The forest itself stores no parent pointers. Callers that need parent or
//! ancestor lookups build this index once instead of re-walking the forest
//! per query. The index is not updated by edits; rebuild it from the new
//! forest value.

use super::{TreeError, TreeResult};
use crate::model::cause::CauseNode;
use crate::model::id::CauseId;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ParentIndex {
    parents: HashMap<CauseId, Option<CauseId>>,
}

impl ParentIndex {
    /// Indexes every node of `roots`.
    ///
    /// # Errors
    /// - `DuplicateCauseId` when an id occurs more than once.
    pub fn build(roots: &[CauseNode]) -> TreeResult<Self> {
        let mut parents = HashMap::new();
        let mut stack: Vec<(&CauseNode, Option<CauseId>)> =
            roots.iter().map(|node| (node, None)).collect();
        while let Some((node, parent)) = stack.pop() {
            if parents.insert(node.id, parent).is_some() {
                return Err(TreeError::DuplicateCauseId(node.id));
            }
            stack.extend(node.children.iter().map(|child| (child, Some(node.id))));
        }
        Ok(Self { parents })
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn contains(&self, id: CauseId) -> bool {
        self.parents.contains_key(&id)
    }

    /// `None` for unknown ids, `Some(None)` for roots.
    pub fn parent_of(&self, id: CauseId) -> Option<Option<CauseId>> {
        self.parents.get(&id).copied()
    }

    /// Ancestors of `id`, nearest first. Empty for roots and unknown ids.
    pub fn ancestors(&self, id: CauseId) -> Vec<CauseId> {
        let mut result = Vec::new();
        let mut cursor = self.parents.get(&id).copied().flatten();
        while let Some(current) = cursor {
            result.push(current);
            cursor = self.parents.get(&current).copied().flatten();
        }
        result
    }

    /// Roots have depth 0.
    pub fn depth(&self, id: CauseId) -> Option<usize> {
        self.contains(id).then(|| self.ancestors(id).len())
    }

    /// Whether `ancestor` lies on the path from `id` up to its root.
    pub fn is_ancestor(&self, ancestor: CauseId, id: CauseId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }
}
