//! Diagram use-case service.
//!
//! # Responsibility
//! - Provide the operations a transport layer maps its routes to: list
//!   users, list/fetch/create/replace/delete diagrams, apply one edit.
//! - Collapse layer errors into the `ErrorKind` taxonomy with HTTP status
//!   codes.
//!
//! # Invariants
//! - Replace validates its request before looking up the diagram.
//! - Every successful write returns the row as read back from storage.

use crate::model::diagram::{CategorySeed, Diagram, DiagramError};
use crate::model::id::{CauseId, DiagramId, UserId};
use crate::model::user::User;
use crate::model::validation::{normalize_problem, ValidationError};
use crate::repo::diagram_repo::DiagramRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use crate::service::sync::{CommitMode, DiagramEdit, DiagramSync, SyncError};
use crate::tree::{forest_from_value, TreeError};
use log::info;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-facing error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    StorageUnavailable,
}

impl ErrorKind {
    /// Status code a transport layer should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Validation => 400,
            Self::Conflict => 409,
            Self::StorageUnavailable => 500,
        }
    }
}

/// Service error for diagram use-cases.
#[derive(Debug)]
pub enum ServiceError {
    DiagramNotFound(DiagramId),
    UserNotFound(UserId),
    CauseNotFound(CauseId),
    Validation(ValidationError),
    /// Move would place a cause beneath itself.
    InvalidMove {
        cause_id: CauseId,
        parent_id: CauseId,
    },
    Conflict {
        diagram_id: DiagramId,
        expected_revision: i64,
        actual_revision: i64,
    },
    /// Persistence-layer failure.
    Storage(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DiagramNotFound(_) | Self::UserNotFound(_) | Self::CauseNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::Validation(_) | Self::InvalidMove { .. } => ErrorKind::Validation,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Storage(_) | Self::InconsistentState(_) => ErrorKind::StorageUnavailable,
        }
    }

    pub fn http_status(&self) -> u16 {
        self.kind().http_status()
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DiagramNotFound(id) => write!(f, "diagram not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::CauseNotFound(id) => write!(f, "cause not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidMove {
                cause_id,
                parent_id,
            } => write!(f, "cannot move cause {cause_id} under {parent_id}"),
            Self::Conflict {
                diagram_id,
                expected_revision,
                actual_revision,
            } => write!(
                f,
                "diagram {diagram_id} was changed by another writer (expected revision {expected_revision}, found {actual_revision})"
            ),
            Self::Storage(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent diagram state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DiagramError> for ServiceError {
    fn from(value: DiagramError) -> Self {
        match value {
            DiagramError::Validation(err) => Self::Validation(err),
            DiagramError::Tree(TreeError::CauseNotFound(id)) => Self::CauseNotFound(id),
            DiagramError::Tree(TreeError::DuplicateCauseId(id)) => {
                Self::Validation(ValidationError::DuplicateCauseId(id))
            }
            DiagramError::Tree(TreeError::CycleDetected {
                cause_id,
                parent_id,
            }) => Self::InvalidMove {
                cause_id,
                parent_id,
            },
            DiagramError::Tree(TreeError::DepthExceeded { max, .. }) => {
                Self::Validation(ValidationError::DepthExceeded { max })
            }
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DiagramNotFound(id) => Self::DiagramNotFound(id),
            RepoError::OwnerNotFound(id) => Self::UserNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::Conflict {
                diagram_id,
                expected_revision,
                actual_revision,
            } => Self::Conflict {
                diagram_id,
                expected_revision,
                actual_revision,
            },
            other => Self::Storage(other),
        }
    }
}

impl From<SyncError> for ServiceError {
    fn from(value: SyncError) -> Self {
        match value {
            SyncError::DiagramNotFound(id) => Self::DiagramNotFound(id),
            SyncError::Edit(err) => err.into(),
            SyncError::Repo(err) => err.into(),
            SyncError::InconsistentState(details) => Self::InconsistentState(details),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Body of a full replace request.
///
/// Both fields are optional at the type level so that a missing field is
/// reported as a validation failure rather than a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReplaceDiagramRequest {
    pub problem: Option<String>,
    pub causes: Option<serde_json::Value>,
    /// Revision the caller's copy was read at. Only consulted under
    /// `CommitMode::RevisionChecked`; defaults to the current stored one.
    pub revision: Option<i64>,
}

/// Diagram service facade over user and diagram repositories.
pub struct DiagramService<D: DiagramRepository, U: UserRepository> {
    sync: DiagramSync<D>,
    users: U,
}

impl<D: DiagramRepository, U: UserRepository> DiagramService<D, U> {
    /// Creates a last-write-wins service.
    pub fn new(diagrams: D, users: U) -> Self {
        Self::with_commit_mode(diagrams, users, CommitMode::default())
    }

    pub fn with_commit_mode(diagrams: D, users: U, mode: CommitMode) -> Self {
        Self {
            sync: DiagramSync::with_mode(diagrams, mode),
            users,
        }
    }

    pub fn commit_mode(&self) -> CommitMode {
        self.sync.mode()
    }

    pub fn list_users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.users.list_users()?)
    }

    pub fn create_user(&self, name: &str) -> ServiceResult<User> {
        let user = self.users.create_user(name)?;
        info!("event=user_create module=service status=ok user_id={}", user.id);
        Ok(user)
    }

    /// Lists an owner's diagrams; unknown owners yield an empty list.
    pub fn list_diagrams(&self, owner_id: UserId) -> ServiceResult<Vec<Diagram>> {
        Ok(self.sync.repo().list_by_owner(owner_id)?)
    }

    pub fn get_diagram(&self, diagram_id: DiagramId) -> ServiceResult<Diagram> {
        Ok(self.sync.read(diagram_id)?)
    }

    /// Fetches a diagram only when it belongs to `owner_id`.
    pub fn get_owned_diagram(
        &self,
        owner_id: UserId,
        diagram_id: DiagramId,
    ) -> ServiceResult<Diagram> {
        let diagram = self.get_diagram(diagram_id)?;
        if diagram.owner_id != owner_id {
            return Err(ServiceError::DiagramNotFound(diagram_id));
        }
        Ok(diagram)
    }

    /// Creates and stores a new diagram for an existing owner.
    pub fn create_diagram(
        &self,
        owner_id: UserId,
        problem: &str,
        seed: CategorySeed,
    ) -> ServiceResult<Diagram> {
        if self.users.get_user(owner_id)?.is_none() {
            return Err(ServiceError::UserNotFound(owner_id));
        }
        let diagram = Diagram::create(owner_id, problem, seed)?;
        let stored = self.sync.commit(&diagram)?;
        info!(
            "event=diagram_create module=service status=ok diagram_id={} owner_id={} roots={}",
            stored.id,
            owner_id,
            stored.causes.len()
        );
        Ok(stored)
    }

    /// Replaces problem and whole forest of an existing diagram.
    ///
    /// # Errors
    /// - `Validation` when problem or causes are missing, blank or malformed.
    /// - `DiagramNotFound` when no row exists for `diagram_id`.
    pub fn replace_diagram(
        &self,
        diagram_id: DiagramId,
        request: ReplaceDiagramRequest,
    ) -> ServiceResult<Diagram> {
        let problem = normalize_problem(request.problem.as_deref().unwrap_or_default())?;
        let causes = forest_from_value(request.causes.ok_or(ValidationError::MissingCauses)?)?;

        let current = self.sync.read(diagram_id)?;
        let mut next = current.with_problem(&problem)?.with_causes(causes)?;
        if let Some(revision) = request.revision {
            next.revision = revision;
        }
        let stored = self.sync.commit(&next)?;
        info!(
            "event=diagram_replace module=service status=ok diagram_id={} revision={} causes={}",
            diagram_id,
            stored.revision,
            stored.cause_count()
        );
        Ok(stored)
    }

    /// Applies one edit through the synchronization cycle.
    pub fn apply_edit(
        &self,
        diagram_id: DiagramId,
        edit: &DiagramEdit,
    ) -> ServiceResult<Diagram> {
        Ok(self.sync.apply_edit(diagram_id, edit)?)
    }

    /// Deletes a diagram; `false` when no row existed.
    pub fn delete_diagram(&self, diagram_id: DiagramId) -> ServiceResult<bool> {
        let removed = self.sync.repo().delete_by_id(diagram_id)?;
        info!(
            "event=diagram_delete module=service status=ok diagram_id={} removed={}",
            diagram_id, removed
        );
        Ok(removed)
    }
}
