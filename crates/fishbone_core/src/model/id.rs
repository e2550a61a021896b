//! Identifier scheme shared by users, diagrams and cause nodes.
//!
//! # Invariants
//! - Every id is a random 128-bit UUID v4 issued once at creation.
//! - Ids are never reused, including after the owning entity is deleted.

use uuid::Uuid;

/// Stable identifier of a diagram owner.
pub type UserId = Uuid;

/// Stable identifier of one diagram row.
pub type DiagramId = Uuid;

/// Identifier of one cause node, unique across its whole diagram.
pub type CauseId = Uuid;

/// Issues a fresh identifier.
pub fn new_id() -> Uuid {
    Uuid::new_v4()
}

/// Parses a hyphenated id received from storage or a caller.
pub fn parse_id(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value.trim()).ok()
}
