//! Core domain logic for fishbone (cause-and-effect) diagrams.
//! This crate is the single source of truth for diagram invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod tree;

pub use config::CoreConfig;
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::cause::CauseNode;
pub use model::diagram::{CategorySeed, Diagram, DiagramError};
pub use model::id::{CauseId, DiagramId, UserId};
pub use model::user::User;
pub use model::validation::ValidationError;
pub use repo::diagram_repo::{DiagramRepository, SqliteDiagramRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use seed::{default_categories, seed_demo_data};
pub use service::diagram_service::{
    DiagramService, ErrorKind, ReplaceDiagramRequest, ServiceError, ServiceResult,
};
pub use service::sync::{CommitMode, DiagramEdit, DiagramSync, SyncError};
pub use tree::{ParentIndex, TreeError, MAX_CAUSE_DEPTH};
