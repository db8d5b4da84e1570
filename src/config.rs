use std::path::PathBuf;
use std::sync::OnceLock;

pub const DB_PATH_ENV: &str = "SHELF_DB_PATH";
pub const IMPORT_DEBUG_ENV: &str = "SHELF_IMPORT_DEBUG";
pub const DEFAULT_DB_FILE: &str = "shelf.db";

static IMPORT_DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let db_path = std::env::var(DB_PATH_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE));
        Config { db_path }
    }

    /// Command line flags win over the environment.
    pub fn with_db_path(mut self, db_path: Option<PathBuf>) -> Self {
        if let Some(path) = db_path {
            self.db_path = path;
        }
        self
    }
}

/// Per-row import tracing, off unless `SHELF_IMPORT_DEBUG` is set to a truthy value.
pub fn import_debug_enabled() -> bool {
    *IMPORT_DEBUG_ENABLED.get_or_init(|| {
        std::env::var(IMPORT_DEBUG_ENV)
            .map(|value| is_truthy(&value))
            .unwrap_or(false)
    })
}

fn is_truthy(value: &str) -> bool {
    let lowered = value.trim().to_ascii_lowercase();
    lowered == "1" || lowered == "true" || lowered == "yes" || lowered == "on"
}
