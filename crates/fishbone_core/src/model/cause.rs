//! Cause node model.
//!
//! # Invariants
//! - `id` is unique across the whole diagram, not only among siblings.
//! - `children` keeps insertion order; readers and writers never reorder it.
//!
//! External documents name the child list `causes`, matching stored rows.

use crate::model::id::{new_id, CauseId};
use serde::{Deserialize, Serialize};

/// One named cause in a diagram forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CauseNode {
    /// Diagram-wide unique id.
    pub id: CauseId,
    /// Non-blank label.
    pub name: String,
    /// Optional free-text annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Ordered sub-causes.
    #[serde(rename = "causes", default)]
    pub children: Vec<CauseNode>,
}

impl CauseNode {
    /// Creates a leaf with a freshly generated id.
    pub fn leaf(name: impl Into<String>, notes: Option<String>) -> Self {
        Self::with_id(new_id(), name, notes)
    }

    /// Creates a leaf with a caller-provided id.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(id: CauseId, name: impl Into<String>, notes: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            notes,
            children: Vec::new(),
        }
    }

    /// Builder-style helper that appends `child` and returns `self`.
    pub fn with_child(mut self, child: CauseNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
