//! Read -> Apply -> Commit cycle for one diagram edit.
//!
//! # Invariants
//! - Exactly one edit is applied per cycle.
//! - Commit writes the whole diagram; a failed commit leaves the stored row
//!   as it was.
//! - `LastWriteWins` has no cross-call transaction: two overlapping cycles on
//!   the same diagram can lose one update. `RevisionChecked` turns that case
//!   into `RepoError::Conflict`.

use crate::model::diagram::{Diagram, DiagramError, DiagramResult};
use crate::model::id::{CauseId, DiagramId};
use crate::repo::diagram_repo::DiagramRepository;
use crate::repo::RepoError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// One logical edit against a diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DiagramEdit {
    SetProblem {
        problem: String,
    },
    AddCategory {
        name: String,
        notes: Option<String>,
    },
    AddSubCause {
        parent_id: CauseId,
        name: String,
        notes: Option<String>,
    },
    EditCause {
        cause_id: CauseId,
        name: String,
        notes: Option<String>,
    },
    DeleteCause {
        cause_id: CauseId,
    },
    MoveCause {
        cause_id: CauseId,
        new_parent_id: Option<CauseId>,
        position: Option<usize>,
    },
}

impl DiagramEdit {
    /// Applies this edit to an in-memory copy.
    pub fn apply(&self, diagram: &Diagram) -> DiagramResult<Diagram> {
        match self {
            Self::SetProblem { problem } => diagram.with_problem(problem),
            Self::AddCategory { name, notes } => diagram.add_category(name, notes.as_deref()),
            Self::AddSubCause {
                parent_id,
                name,
                notes,
            } => diagram.add_sub_cause(*parent_id, name, notes.as_deref()),
            Self::EditCause {
                cause_id,
                name,
                notes,
            } => diagram.edit_cause(*cause_id, name, notes.as_deref()),
            Self::DeleteCause { cause_id } => Ok(diagram.delete_cause(*cause_id)),
            Self::MoveCause {
                cause_id,
                new_parent_id,
                position,
            } => diagram.move_cause(*cause_id, *new_parent_id, *position),
        }
    }

    /// Stable label for log events.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SetProblem { .. } => "set_problem",
            Self::AddCategory { .. } => "add_category",
            Self::AddSubCause { .. } => "add_sub_cause",
            Self::EditCause { .. } => "edit_cause",
            Self::DeleteCause { .. } => "delete_cause",
            Self::MoveCause { .. } => "move_cause",
        }
    }
}

/// How a commit treats concurrent writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitMode {
    /// Unconditional full replace.
    #[default]
    LastWriteWins,
    /// Replace only when the stored revision still equals the one read.
    RevisionChecked,
}

impl CommitMode {
    fn label(self) -> &'static str {
        match self {
            Self::LastWriteWins => "last_write_wins",
            Self::RevisionChecked => "revision_checked",
        }
    }
}

/// Errors from one synchronization cycle.
#[derive(Debug)]
pub enum SyncError {
    /// Read step found no diagram.
    DiagramNotFound(DiagramId),
    /// Apply step rejected the edit.
    Edit(DiagramError),
    /// Commit or read-back failed.
    Repo(RepoError),
    /// Committed row could not be read back.
    InconsistentState(&'static str),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DiagramNotFound(id) => write!(f, "diagram not found: {id}"),
            Self::Edit(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent diagram state: {details}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Edit(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DiagramError> for SyncError {
    fn from(value: DiagramError) -> Self {
        Self::Edit(value)
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DiagramNotFound(id) => Self::DiagramNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Drives Read -> Apply -> Commit over a diagram repository.
pub struct DiagramSync<R: DiagramRepository> {
    repo: R,
    mode: CommitMode,
}

impl<R: DiagramRepository> DiagramSync<R> {
    /// Creates a synchronizer with `CommitMode::LastWriteWins`.
    pub fn new(repo: R) -> Self {
        Self::with_mode(repo, CommitMode::default())
    }

    pub fn with_mode(repo: R, mode: CommitMode) -> Self {
        Self { repo, mode }
    }

    pub fn mode(&self) -> CommitMode {
        self.mode
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Read step: latest stored diagram.
    pub fn read(&self, diagram_id: DiagramId) -> Result<Diagram, SyncError> {
        self.repo
            .get_by_id(diagram_id)?
            .ok_or(SyncError::DiagramNotFound(diagram_id))
    }

    /// Runs one full cycle and returns the committed diagram.
    pub fn apply_edit(
        &self,
        diagram_id: DiagramId,
        edit: &DiagramEdit,
    ) -> Result<Diagram, SyncError> {
        let started_at = Instant::now();
        let current = self.read(diagram_id)?;
        let next = edit.apply(&current).inspect_err(|_| {
            debug!(
                "event=diagram_edit module=sync status=rejected diagram_id={} op={}",
                diagram_id,
                edit.label()
            );
        })?;
        let committed = self.commit(&next)?;
        debug!(
            "event=diagram_edit module=sync status=ok diagram_id={} op={} revision={} duration_ms={}",
            diagram_id,
            edit.label(),
            committed.revision,
            started_at.elapsed().as_millis()
        );
        Ok(committed)
    }

    /// Commit step for a diagram edited off-line (for example a client-held
    /// copy). Under `RevisionChecked`, `diagram.revision` is the expected
    /// stored revision, and 0 means "create".
    pub fn commit(&self, diagram: &Diagram) -> Result<Diagram, SyncError> {
        let result = match self.mode {
            CommitMode::LastWriteWins => self.repo.put(diagram),
            CommitMode::RevisionChecked => self
                .repo
                .put_if_revision(diagram, diagram.revision)
                .map(|_| ()),
        };
        if let Err(err) = result {
            warn!(
                "event=diagram_commit module=sync status=error diagram_id={} mode={} error={}",
                diagram.id,
                self.mode.label(),
                err
            );
            return Err(err.into());
        }

        self.repo
            .get_by_id(diagram.id)?
            .ok_or(SyncError::InconsistentState(
                "committed diagram not found in read-back",
            ))
    }
}
