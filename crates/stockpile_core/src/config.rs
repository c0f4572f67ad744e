//! Runtime configuration for front ends embedding the core.
//!
//! # Responsibility
//! - Resolve database and logging locations from the environment.
//! - Give front ends one place to apply their own overrides.
//!
//! # Invariants
//! - Resolution never fails; blank variables fall back to defaults.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "STOCKPILE_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "STOCKPILE_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "STOCKPILE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "stockpile.sqlite3";

/// Where the store lives and how it logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is disabled when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Resolves configuration from `STOCKPILE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = non_blank(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = non_blank(LOG_LEVEL_ENV) {
            config.log_level = level;
        }
        config.log_dir = non_blank(LOG_DIR_ENV).map(PathBuf::from);
        config
    }
}
