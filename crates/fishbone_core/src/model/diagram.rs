//! Diagram aggregate.
//!
//! # Responsibility
//! - Pair one problem statement and owner with one cause forest.
//! - Apply exactly one forest edit per call and return the updated diagram.
//!
//! # Invariants
//! - Edits never mutate `self`; callers can diff the old and new value.
//! - `problem` and every cause name are non-blank after normalization.
//! - `revision` is owned by storage. Edits carry it forward unchanged so a
//!   checked commit can compare it with the stored row.

use crate::model::cause::CauseNode;
use crate::model::id::{new_id, CauseId, DiagramId, UserId};
use crate::model::validation::{
    normalize_cause_name, normalize_notes, normalize_problem, ValidationError,
};
use crate::seed::default_categories;
use crate::tree::{self, validate_forest, TreeError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DiagramResult<T> = Result<T, DiagramError>;

/// Errors from diagram aggregate edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramError {
    Validation(ValidationError),
    Tree(TreeError),
}

impl DiagramError {
    /// Whether the edit addressed a cause id that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Tree(TreeError::CauseNotFound(_)))
    }
}

impl Display for DiagramError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Tree(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DiagramError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Tree(err) => Some(err),
        }
    }
}

impl From<ValidationError> for DiagramError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<TreeError> for DiagramError {
    fn from(value: TreeError) -> Self {
        Self::Tree(value)
    }
}

/// Initial forest choice for a new diagram.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategorySeed {
    /// No roots.
    #[default]
    Empty,
    /// The six standard categories, each with fresh ids.
    Default,
    /// Caller-provided roots, validated before use.
    Custom(Vec<CauseNode>),
}

/// One fishbone diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagram {
    pub id: DiagramId,
    pub owner_id: UserId,
    pub problem: String,
    /// Top-level categories in display order.
    pub causes: Vec<CauseNode>,
    /// Stored row revision this value was read at; 0 before the first write.
    #[serde(default)]
    pub revision: i64,
}

impl Diagram {
    /// Creates an unsaved diagram with a fresh id.
    ///
    /// # Errors
    /// - `Validation` when `problem` is blank or a custom seed is invalid.
    pub fn create(owner_id: UserId, problem: &str, seed: CategorySeed) -> DiagramResult<Self> {
        let problem = normalize_problem(problem)?;
        let causes = match seed {
            CategorySeed::Empty => Vec::new(),
            CategorySeed::Default => default_categories(),
            CategorySeed::Custom(roots) => {
                validate_forest(&roots)?;
                roots
            }
        };
        Ok(Self {
            id: new_id(),
            owner_id,
            problem,
            causes,
            revision: 0,
        })
    }

    pub fn find_cause(&self, id: CauseId) -> Option<&CauseNode> {
        tree::find(&self.causes, id)
    }

    /// First cause in pre-order whose name equals `name`.
    pub fn find_cause_by_name(&self, name: &str) -> Option<&CauseNode> {
        tree::PreOrder::new(&self.causes).find(|node| node.name == name)
    }

    pub fn cause_count(&self) -> usize {
        tree::count(&self.causes)
    }

    /// Replaces the problem statement; the forest is unchanged.
    pub fn with_problem(&self, problem: &str) -> DiagramResult<Self> {
        let problem = normalize_problem(problem)?;
        Ok(Self {
            problem,
            ..self.clone()
        })
    }

    /// Replaces the whole forest after validating it.
    pub fn with_causes(&self, causes: Vec<CauseNode>) -> DiagramResult<Self> {
        validate_forest(&causes)?;
        Ok(Self {
            causes,
            ..self.clone()
        })
    }

    /// Appends a new root category.
    pub fn add_category(&self, name: &str, notes: Option<&str>) -> DiagramResult<Self> {
        let node = new_leaf(name, notes)?;
        Ok(self.replace_causes(tree::insert_root(&self.causes, node)))
    }

    /// Appends a new sub-cause under `parent_id`.
    ///
    /// # Errors
    /// - `Tree(CauseNotFound)` when `parent_id` is absent anywhere in the tree.
    pub fn add_sub_cause(
        &self,
        parent_id: CauseId,
        name: &str,
        notes: Option<&str>,
    ) -> DiagramResult<Self> {
        let node = new_leaf(name, notes)?;
        let causes = tree::insert_child(&self.causes, parent_id, node)?;
        Ok(self.replace_causes(causes))
    }

    /// Renames and re-annotates one cause.
    pub fn edit_cause(&self, id: CauseId, name: &str, notes: Option<&str>) -> DiagramResult<Self> {
        let name = normalize_cause_name(name)?;
        let causes = tree::rename(&self.causes, id, name, normalize_notes(notes))?;
        Ok(self.replace_causes(causes))
    }

    /// Deletes one cause and its subtree. Absent ids are a no-op.
    pub fn delete_cause(&self, id: CauseId) -> Self {
        self.replace_causes(tree::remove(&self.causes, id))
    }

    /// Moves one cause subtree, see `tree::move_cause`.
    pub fn move_cause(
        &self,
        id: CauseId,
        new_parent: Option<CauseId>,
        position: Option<usize>,
    ) -> DiagramResult<Self> {
        let causes = tree::move_cause(&self.causes, id, new_parent, position)?;
        Ok(self.replace_causes(causes))
    }

    fn replace_causes(&self, causes: Vec<CauseNode>) -> Self {
        Self {
            id: self.id,
            owner_id: self.owner_id,
            problem: self.problem.clone(),
            causes,
            revision: self.revision,
        }
    }
}

fn new_leaf(name: &str, notes: Option<&str>) -> Result<CauseNode, ValidationError> {
    let name = normalize_cause_name(name)?;
    Ok(CauseNode::leaf(name, normalize_notes(notes)))
}
