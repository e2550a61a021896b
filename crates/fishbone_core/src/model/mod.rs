//! Domain model for fishbone diagrams.
//!
//! # Responsibility
//! - Define the diagram aggregate, its cause nodes and owners.
//! - Normalize and validate user-provided text.
//!
//! # Invariants
//! - Every user, diagram and cause is identified by a stable UUID.
//! - Cause ids are unique within one diagram.

pub mod cause;
pub mod diagram;
pub mod id;
pub mod user;
pub mod validation;
