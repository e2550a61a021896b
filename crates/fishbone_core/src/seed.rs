//! Default categories and demo data.
//!
//! # Invariants
//! - Every call issues fresh ids; seeded nodes never share ids across
//!   diagrams.
//! - Demo data is inserted only into a database without users.

use crate::model::cause::CauseNode;
use crate::model::diagram::{CategorySeed, Diagram};
use crate::model::id::UserId;
use crate::repo::diagram_repo::DiagramRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;
use serde::Deserialize;
use std::collections::HashMap;

/// The six standard fishbone categories with their default notes.
pub const DEFAULT_CATEGORIES: [(&str, &str); 6] = [
    (
        "Materials",
        "Issues related to materials, supplies, or resources",
    ),
    (
        "Measurement",
        "Issues related to measurement, monitoring, or data collection",
    ),
    (
        "Environment",
        "Issues related to environmental factors or conditions",
    ),
    (
        "Method",
        "Issues related to processes, procedures, or methodologies",
    ),
    (
        "Machine",
        "Issues related to equipment, tools, or machinery",
    ),
    (
        "People",
        "Issues related to human factors, skills, or training",
    ),
];

/// Builds the six standard categories as leaf roots with fresh ids.
pub fn default_categories() -> Vec<CauseNode> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, notes)| CauseNode::leaf(*name, Some((*notes).to_string())))
        .collect()
}

// Five demo users with three diagrams each, in insertion order.
const DEMO_DIAGRAMS_JSON: &str = include_str!("demo_diagrams.json");

#[derive(Debug, Deserialize)]
struct DemoDiagram {
    owner: String,
    problem: String,
    causes: Vec<DemoCause>,
}

#[derive(Debug, Deserialize)]
struct DemoCause {
    name: String,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    causes: Vec<DemoCause>,
}

impl DemoCause {
    fn into_node(self) -> CauseNode {
        self.causes
            .into_iter()
            .fold(CauseNode::leaf(self.name, self.notes), |node, child| {
                node.with_child(child.into_node())
            })
    }
}

/// Inserts the demo users and their sample diagrams.
///
/// Returns the number of diagrams written; 0 when users already exist.
pub fn seed_demo_data(
    users: &impl UserRepository,
    diagrams: &impl DiagramRepository,
) -> RepoResult<usize> {
    if !users.list_users()?.is_empty() {
        info!("event=seed_demo module=seed status=skipped reason=users_present");
        return Ok(0);
    }

    let demos: Vec<DemoDiagram> = serde_json::from_str(DEMO_DIAGRAMS_JSON)
        .map_err(|err| RepoError::InvalidData(format!("invalid demo data: {err}")))?;

    let mut owners: HashMap<String, UserId> = HashMap::new();
    let mut written = 0;
    for demo in demos {
        let owner_id = match owners.get(&demo.owner).copied() {
            Some(id) => id,
            None => {
                let user = users.create_user(&demo.owner)?;
                owners.insert(demo.owner, user.id);
                user.id
            }
        };
        let roots = demo.causes.into_iter().map(DemoCause::into_node).collect();
        let diagram = Diagram::create(owner_id, &demo.problem, CategorySeed::Custom(roots))
            .map_err(|err| RepoError::InvalidData(err.to_string()))?;
        diagrams.put(&diagram)?;
        written += 1;
    }

    info!(
        "event=seed_demo module=seed status=ok users={} diagrams={written}",
        owners.len()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::{DemoCause, DemoDiagram, DEMO_DIAGRAMS_JSON};

    #[test]
    fn demo_data_keeps_nested_causes_and_notes() {
        let demos: Vec<DemoDiagram> =
            serde_json::from_str(DEMO_DIAGRAMS_JSON).expect("demo data parses");
        assert_eq!(demos.len(), 15);

        let first = demos.into_iter().next().expect("first demo diagram");
        assert_eq!(first.owner, "Alice Johnson");
        let roots: Vec<_> = first.causes.into_iter().map(DemoCause::into_node).collect();
        let review = &roots[0].children[0];
        assert_eq!(review.name, "Code Review");
        assert_eq!(
            review.notes.as_deref(),
            Some("Lack of thorough code review process")
        );
        let grandchildren: Vec<&str> =
            review.children.iter().map(|node| node.name.as_str()).collect();
        assert_eq!(grandchildren, ["Time Pressure", "Insufficient Training"]);
    }
}
