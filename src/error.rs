use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Book {0} not found")]
    NotFound(String),

    #[error("Database failure: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to encode book field: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to create database directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt book record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Failures that stop an import before or while it runs. Problems with a
/// single row never surface here; they are folded into the `ImportResult`.
#[derive(thiserror::Error, Debug)]
pub enum ImportError {
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown connector: {0}")]
    UnknownConnector(String),

    #[error("Not a {connector} export: none of the expected columns are present")]
    NotAnExport { connector: &'static str },

    #[error("Failed to read export: {0}")]
    Read(#[from] csv::Error),

    #[error("Store failure: {0}")]
    Store(#[from] StoreError),
}
