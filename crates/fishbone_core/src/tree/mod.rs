//! Cause forest operations.
//!
//! # Responsibility
//! - Provide pure structural edits over an ordered forest of cause nodes.
//! - Encode and decode the forest document stored with each diagram.
//!
//! # Invariants
//! - No operation mutates its input; each returns a new forest value.
//! - Sibling order is insertion order and survives every edit and round trip.
//! - Removing a node removes its whole subtree.
//! - No forest nests deeper than `MAX_CAUSE_DEPTH` levels, roots counting as
//!   level 1. Every stored document therefore stays within the JSON
//!   decoder's nesting limit.

use crate::model::id::CauseId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod document;
pub mod forest;
pub mod index;

pub use document::{decode_forest, encode_forest, forest_from_value, DocumentError};
pub use forest::{
    collect_ids, count, find, height, insert_child, insert_root, move_cause, remove, rename,
    validate_forest, PreOrder,
};
pub use index::ParentIndex;

/// Deepest level a cause may sit at; top-level categories are level 1.
pub const MAX_CAUSE_DEPTH: usize = 32;

/// Result type used by forest operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors from structural forest operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Target or parent id does not resolve to any node.
    CauseNotFound(CauseId),
    /// Same id occurs twice in the forest.
    DuplicateCauseId(CauseId),
    /// Move would place a node beneath itself.
    CycleDetected {
        cause_id: CauseId,
        parent_id: CauseId,
    },
    /// Edit would push `cause_id` or one of its descendants below level `max`.
    DepthExceeded { cause_id: CauseId, max: usize },
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CauseNotFound(id) => write!(f, "cause not found: {id}"),
            Self::DuplicateCauseId(id) => write!(f, "duplicate cause id: {id}"),
            Self::CycleDetected {
                cause_id,
                parent_id,
            } => write!(
                f,
                "move would create cycle: cause {cause_id} under parent {parent_id}"
            ),
            Self::DepthExceeded { cause_id, max } => {
                write!(f, "cause {cause_id} would nest deeper than {max} levels")
            }
        }
    }
}

impl Error for TreeError {}
