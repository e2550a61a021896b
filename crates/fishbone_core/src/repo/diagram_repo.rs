//! Diagram repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist whole diagrams keyed by diagram id.
//! - Track a per-row revision for checked (optimistic) writes.
//!
//! # Invariants
//! - One row per diagram: `(id, owner_id, problem, causes, revision)`.
//! - `causes` always holds the complete forest document; writes replace it
//!   in full, never field by field.
//! - `revision` starts at 1 and grows by one on every successful write.
//! - `list_by_owner` order is row insertion order.

use super::schema::ensure_connection_ready;
use super::{parse_uuid, user_exists, RepoError, RepoResult};
use crate::model::diagram::Diagram;
use crate::model::id::{DiagramId, UserId};
use crate::model::validation::ValidationError;
use crate::tree::{decode_forest, encode_forest, validate_forest};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const DIAGRAM_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    problem,
    causes,
    revision
FROM diagrams";

/// Repository interface for whole-diagram persistence.
pub trait DiagramRepository {
    /// Inserts or fully replaces the row for `diagram.id`.
    ///
    /// The stored revision is bumped; `diagram.revision` is ignored.
    fn put(&self, diagram: &Diagram) -> RepoResult<()>;
    /// Replaces the row only while its revision equals `expected_revision`.
    ///
    /// `expected_revision == 0` means the row must not exist yet. Returns the
    /// new stored revision.
    fn put_if_revision(&self, diagram: &Diagram, expected_revision: i64) -> RepoResult<i64>;
    /// Loads one diagram by id.
    fn get_by_id(&self, id: DiagramId) -> RepoResult<Option<Diagram>>;
    /// Lists diagrams of one owner in insertion order.
    fn list_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<Diagram>>;
    /// Deletes one diagram; `true` when a row was removed.
    fn delete_by_id(&self, id: DiagramId) -> RepoResult<bool>;
}

/// SQLite-backed diagram repository.
pub struct SqliteDiagramRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDiagramRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "diagrams",
            &[
                "id",
                "owner_id",
                "problem",
                "causes",
                "revision",
                "created_at",
                "updated_at",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl DiagramRepository for SqliteDiagramRepository<'_> {
    fn put(&self, diagram: &Diagram) -> RepoResult<()> {
        let document = prepare_write(diagram)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_owner_exists(&tx, diagram.owner_id)?;
        tx.execute(
            "INSERT INTO diagrams (id, owner_id, problem, causes, revision)
             VALUES (?1, ?2, ?3, ?4, 1)
             ON CONFLICT(id) DO UPDATE SET
                owner_id = excluded.owner_id,
                problem = excluded.problem,
                causes = excluded.causes,
                revision = diagrams.revision + 1,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                diagram.id.to_string(),
                diagram.owner_id.to_string(),
                diagram.problem.as_str(),
                document,
            ],
        )?;
        tx.commit()?;

        debug!(
            "event=diagram_put module=repo status=ok diagram_id={} mode=overwrite",
            diagram.id
        );
        Ok(())
    }

    fn put_if_revision(&self, diagram: &Diagram, expected_revision: i64) -> RepoResult<i64> {
        let document = prepare_write(diagram)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_owner_exists(&tx, diagram.owner_id)?;
        let changed = if expected_revision == 0 {
            tx.execute(
                "INSERT INTO diagrams (id, owner_id, problem, causes, revision)
                 VALUES (?1, ?2, ?3, ?4, 1)
                 ON CONFLICT(id) DO NOTHING;",
                params![
                    diagram.id.to_string(),
                    diagram.owner_id.to_string(),
                    diagram.problem.as_str(),
                    document,
                ],
            )?
        } else {
            tx.execute(
                "UPDATE diagrams
                 SET owner_id = ?2,
                     problem = ?3,
                     causes = ?4,
                     revision = revision + 1,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1
                   AND revision = ?5;",
                params![
                    diagram.id.to_string(),
                    diagram.owner_id.to_string(),
                    diagram.problem.as_str(),
                    document,
                    expected_revision,
                ],
            )?
        };

        if changed == 0 {
            let actual_revision: Option<i64> = tx
                .query_row(
                    "SELECT revision FROM diagrams WHERE id = ?1;",
                    [diagram.id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            debug!(
                "event=diagram_put module=repo status=rejected diagram_id={} mode=checked expected_revision={}",
                diagram.id, expected_revision
            );
            return Err(match actual_revision {
                None => RepoError::DiagramNotFound(diagram.id),
                Some(actual_revision) => RepoError::Conflict {
                    diagram_id: diagram.id,
                    expected_revision,
                    actual_revision,
                },
            });
        }
        tx.commit()?;

        let revision = expected_revision + 1;
        debug!(
            "event=diagram_put module=repo status=ok diagram_id={} mode=checked revision={}",
            diagram.id, revision
        );
        Ok(revision)
    }

    fn get_by_id(&self, id: DiagramId) -> RepoResult<Option<Diagram>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DIAGRAM_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_diagram_row(row)?));
        }
        Ok(None)
    }

    fn list_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<Diagram>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DIAGRAM_SELECT_SQL} WHERE owner_id = ?1 ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query([owner_id.to_string()])?;
        let mut diagrams = Vec::new();
        while let Some(row) = rows.next()? {
            diagrams.push(parse_diagram_row(row)?);
        }
        Ok(diagrams)
    }

    fn delete_by_id(&self, id: DiagramId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM diagrams WHERE id = ?1;", [id.to_string()])?;
        debug!(
            "event=diagram_delete module=repo status=ok diagram_id={} removed={}",
            id,
            changed > 0
        );
        Ok(changed > 0)
    }
}

fn prepare_write(diagram: &Diagram) -> RepoResult<String> {
    if diagram.problem.trim().is_empty() {
        return Err(RepoError::Validation(ValidationError::BlankProblem));
    }
    validate_forest(&diagram.causes)?;
    encode_forest(&diagram.causes).map_err(|err| RepoError::InvalidData(err.to_string()))
}

fn ensure_owner_exists(conn: &Connection, owner_id: UserId) -> RepoResult<()> {
    if !user_exists(conn, owner_id)? {
        return Err(RepoError::OwnerNotFound(owner_id));
    }
    Ok(())
}

fn parse_diagram_row(row: &Row<'_>) -> RepoResult<Diagram> {
    let id_text: String = row.get("id")?;
    let owner_text: String = row.get("owner_id")?;
    let document: String = row.get("causes")?;
    let causes = decode_forest(&document)
        .map_err(|err| RepoError::InvalidData(format!("invalid diagrams.causes: {err}")))?;

    Ok(Diagram {
        id: parse_uuid(&id_text, "diagrams.id")?,
        owner_id: parse_uuid(&owner_text, "diagrams.owner_id")?,
        problem: row.get("problem")?,
        causes,
        revision: row.get("revision")?,
    })
}
