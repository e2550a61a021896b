//! Input normalization for user-authored diagram text.
//!
//! # Invariants
//! - Problem statements and cause names are never blank after normalization.
//! - Blank notes are stored as absent, never as empty strings.

use crate::model::id::CauseId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Rejected caller input or malformed documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Problem statement is blank after trim.
    BlankProblem,
    /// Cause name is blank after trim.
    BlankCauseName,
    /// User display name is blank after trim.
    BlankUserName,
    /// Same cause id appears more than once in one forest.
    DuplicateCauseId(CauseId),
    /// Causes payload is missing from a replace request.
    MissingCauses,
    /// Causes payload cannot be decoded as a forest.
    MalformedCauses(String),
    /// Forest nests deeper than `max` levels.
    DepthExceeded { max: usize },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankProblem => write!(f, "problem must not be blank"),
            Self::BlankCauseName => write!(f, "cause name must not be blank"),
            Self::BlankUserName => write!(f, "user name must not be blank"),
            Self::DuplicateCauseId(id) => write!(f, "duplicate cause id: {id}"),
            Self::MissingCauses => write!(f, "causes are required"),
            Self::MalformedCauses(message) => write!(f, "malformed causes: {message}"),
            Self::DepthExceeded { max } => write!(f, "causes nest deeper than {max} levels"),
        }
    }
}

impl Error for ValidationError {}

/// Normalizes a problem statement.
pub fn normalize_problem(value: &str) -> Result<String, ValidationError> {
    normalize_line(value).ok_or(ValidationError::BlankProblem)
}

/// Normalizes a cause name.
pub fn normalize_cause_name(value: &str) -> Result<String, ValidationError> {
    normalize_line(value).ok_or(ValidationError::BlankCauseName)
}

/// Normalizes a user display name.
pub fn normalize_user_name(value: &str) -> Result<String, ValidationError> {
    normalize_line(value).ok_or(ValidationError::BlankUserName)
}

/// Normalizes optional notes.
///
/// Notes are free text, so line breaks are kept and only outer whitespace is
/// trimmed.
pub fn normalize_notes(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

fn normalize_line(value: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(value.trim(), " ");
    if collapsed.is_empty() {
        return None;
    }
    Some(collapsed.into_owned())
}
