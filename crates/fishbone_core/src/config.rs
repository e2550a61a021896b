//! Runtime configuration for core callers.
//!
//! Resolution order: explicit overrides (CLI flags), then environment
//! variables, then built-in defaults. Blank environment values count as
//! unset. `FISHBONE_SEED_CATEGORIES` accepts `true|false|1|0|yes|no|on|off`.

use crate::logging::{default_log_level, normalize_level};
use crate::model::diagram::CategorySeed;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "FISHBONE_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "FISHBONE_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "FISHBONE_LOG_DIR";
pub const SEED_CATEGORIES_ENV: &str = "FISHBONE_SEED_CATEGORIES";
pub const DEFAULT_DB_FILE_NAME: &str = "fishbone.sqlite3";

/// Resolved settings for opening the store and starting logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute log directory; logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
    /// Seed new diagrams with the six standard categories.
    pub seed_default_categories: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            seed_default_categories: true,
        }
    }
}

impl CoreConfig {
    /// Builds configuration from process environment over defaults.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(LOG_LEVEL_ENV) {
            config.log_level = normalize_level(&level)?.to_string();
        }
        config.log_dir = read(LOG_DIR_ENV).map(PathBuf::from);
        if let Some(flag) = read(SEED_CATEGORIES_ENV) {
            config.seed_default_categories = parse_flag(SEED_CATEGORIES_ENV, &flag)?;
        }
        Ok(config)
    }

    /// Seed choice implied by `seed_default_categories`.
    pub fn category_seed(&self) -> CategorySeed {
        if self.seed_default_categories {
            CategorySeed::Default
        } else {
            CategorySeed::Empty
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("{key} must be true or false, got `{other}`")),
    }
}
