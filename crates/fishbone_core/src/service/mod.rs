//! Core use-case services.
//!
//! # Responsibility
//! - Run the read/apply/commit cycle for single diagram edits.
//! - Expose transport-facing diagram operations with a status taxonomy.
//! - Keep CLI/transport layers decoupled from storage details.

pub mod diagram_service;
pub mod sync;
