//! User repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `list_users` returns users in insertion order.
//! - User names are normalized and non-blank.

use super::schema::ensure_connection_ready;
use super::{parse_uuid, RepoResult};
use crate::model::id::{new_id, UserId};
use crate::model::user::User;
use crate::model::validation::normalize_user_name;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for diagram owners.
pub trait UserRepository {
    /// Creates one user with a fresh id.
    fn create_user(&self, name: &str) -> RepoResult<User>;
    /// Loads one user by id.
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Lists all users in insertion order.
    fn list_users(&self) -> RepoResult<Vec<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "users", &["id", "name", "created_at"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, name: &str) -> RepoResult<User> {
        let user = User {
            id: new_id(),
            name: normalize_user_name(name)?,
        };
        self.conn.execute(
            "INSERT INTO users (id, name) VALUES (?1, ?2);",
            params![user.id.to_string(), user.name.as_str()],
        )?;
        Ok(user)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, name FROM users WHERE id = ?1;",
                [id.to_string()],
                |row| Ok(read_user_columns(row)),
            )
            .optional()?;
        user.transpose()
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM users ORDER BY rowid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(read_user_columns(row)?);
        }
        Ok(users)
    }
}

fn read_user_columns(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    Ok(User {
        id: parse_uuid(&id_text, "users.id")?,
        name: row.get("name")?,
    })
}
