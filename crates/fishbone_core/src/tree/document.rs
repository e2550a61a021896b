//! Forest document codec.
//!
//! A diagram's forest is stored as one JSON array of nested nodes:
//! `[{"id": "...", "name": "...", "notes": "...", "causes": [...]}]`.
//! `notes` is omitted when absent and `causes` defaults to empty on read.
//!
//! # Invariants
//! - Decoded forests always pass `validate_forest`.
//! - Child order in the document is the child order in memory.

use super::forest::validate_forest;
use crate::model::cause::CauseNode;
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum DocumentError {
    /// Text is not a well-formed forest document.
    Json(serde_json::Error),
    /// Document parsed but breaks a forest invariant.
    Invalid(ValidationError),
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "{err}"),
            Self::Invalid(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Invalid(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<ValidationError> for DocumentError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

/// Serializes `roots` into its stored document form.
pub fn encode_forest(roots: &[CauseNode]) -> Result<String, DocumentError> {
    Ok(serde_json::to_string(roots)?)
}

/// Parses and validates a stored document.
pub fn decode_forest(text: &str) -> Result<Vec<CauseNode>, DocumentError> {
    let roots: Vec<CauseNode> = serde_json::from_str(text)?;
    validate_forest(&roots)?;
    Ok(roots)
}

/// Converts a caller-supplied causes payload into a validated forest.
pub fn forest_from_value(value: serde_json::Value) -> Result<Vec<CauseNode>, ValidationError> {
    let roots: Vec<CauseNode> = serde_json::from_value(value)
        .map_err(|err| ValidationError::MalformedCauses(err.to_string()))?;
    validate_forest(&roots)?;
    Ok(roots)
}
