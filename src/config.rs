//! Runtime configuration read from the environment.
use std::env;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_PATH: &str = "exam_prep.sqlite3";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `EXAM_PREP_DB` and `EXAM_PREP_LOG`, falling back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            database_path: lookup("EXAM_PREP_DB")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            log_filter: lookup("EXAM_PREP_LOG")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.log_filter),
        }
    }
}
