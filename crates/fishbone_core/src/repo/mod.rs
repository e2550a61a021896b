//! Persistence gateway contracts and SQLite implementations.
//!
//! # Responsibility
//! - Store whole diagrams (owner, problem, forest document) as single rows.
//! - Keep SQL details and schema checks inside the repository boundary.
//!
//! # Invariants
//! - Write paths validate the forest before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Every call is one statement or one immediate transaction; a failed
//!   write leaves the previous row intact.

use crate::db::DbError;
use crate::model::id::{parse_id, DiagramId, UserId};
use crate::model::validation::ValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod diagram_repo;
mod schema;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Diagram rejected before write.
    Validation(ValidationError),
    /// Target diagram row does not exist.
    DiagramNotFound(DiagramId),
    /// Owner referenced by a diagram does not exist.
    OwnerNotFound(UserId),
    /// Stored revision differs from the revision the write was based on.
    Conflict {
        diagram_id: DiagramId,
        expected_revision: i64,
        actual_revision: i64,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::DiagramNotFound(id) => write!(f, "diagram not found: {id}"),
            Self::OwnerNotFound(id) => write!(f, "user not found: {id}"),
            Self::Conflict {
                diagram_id,
                expected_revision,
                actual_revision,
            } => write!(
                f,
                "diagram {diagram_id} changed: expected revision {expected_revision}, found {actual_revision}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    parse_id(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn user_exists(conn: &Connection, user_id: UserId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
        [user_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
