use std::fs::File;
use std::path::Path;

pub mod config;
pub mod db;
pub mod error;
pub mod importer;
pub mod models;
pub mod parser;
pub mod store;

pub use error::{ImportError, StoreError};
pub use models::{Book, BookFilter, BookPayload, ImportResult, ReadingStatus, RowError};
pub use store::{BookStore, InMemoryBookStore, SqliteBookStore};

use parser::goodreads::{self, GoodreadsNormalizer};

/// Imports the export at `file_path` with the named connector.
///
/// `Err` means the import did not run (unknown connector, unreadable file,
/// store failure). Rows that were skipped or rejected are reported inside the
/// returned `ImportResult` instead.
pub fn import<S: BookStore + ?Sized>(
    store: &mut S,
    connector_name: &str,
    file_path: &Path,
    dry_run: bool,
) -> Result<ImportResult, ImportError> {
    let connector = connector_name.trim().to_ascii_lowercase();
    if connector != goodreads::CONNECTOR_NAME {
        return Err(ImportError::UnknownConnector(connector_name.to_string()));
    }

    log::info!("importing {} ({})", file_path.display(), connector);
    let file = File::open(file_path).map_err(|source| ImportError::Open {
        path: file_path.to_path_buf(),
        source,
    })?;
    let rows = goodreads::read_export(file)?;
    importer::run(&GoodreadsNormalizer, store, rows, dry_run)
}
