//! Diagram owner model.

use crate::model::id::UserId;
use serde::{Deserialize, Serialize};

/// Owner reference for diagrams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}
