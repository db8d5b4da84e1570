use crate::config;
use crate::error::ImportError;
use crate::models::{ImportResult, RowError};
use crate::parser::{Normalized, RecordNormalizer, SourceRow};
use crate::store::BookStore;
use std::collections::HashSet;

/// Runs rows through `normalizer` and upserts every valid book into `store`
/// by its (`source_connector`, `source_id`) identity.
///
/// Rows are handled one at a time in source order, so a later row sees what
/// earlier rows wrote. Skipped and malformed rows are counted and the batch
/// goes on; a read failure or any store failure aborts the run with `Err`.
///
/// With `dry_run` the existence lookup still happens but nothing is written.
/// Counts match what a real run on the same store would report.
pub fn run<N, S, I>(
    normalizer: &N,
    store: &mut S,
    rows: I,
    dry_run: bool,
) -> Result<ImportResult, ImportError>
where
    N: RecordNormalizer,
    S: BookStore + ?Sized,
    I: IntoIterator<Item = Result<SourceRow<N::Row>, ImportError>>,
{
    let connector = normalizer.connector();
    let debug_enabled = config::import_debug_enabled();
    let mut result = ImportResult::default();
    // identities a dry run would have created so far
    let mut planned: HashSet<String> = HashSet::new();

    log::info!("import start connector={} dry_run={}", connector, dry_run);

    for row in rows {
        let SourceRow { number, record } = row?;
        let record = match record {
            Ok(record) => record,
            Err(reason) => {
                log::warn!("{} row {} unreadable: {}", connector, number, reason);
                result.errors.push(RowError {
                    row: number,
                    source_id: None,
                    reason,
                });
                continue;
            }
        };

        let payload = match normalizer.normalize(&record) {
            Normalized::Book(payload) => payload,
            Normalized::Skip(reason) => {
                log::info!("{} row {} skipped: {}", connector, number, reason);
                result.skipped += 1;
                continue;
            }
            Normalized::Error(reason) => {
                let source_id = normalizer.source_id(&record).map(str::to_string);
                log::warn!(
                    "{} row {} ({}) rejected: {}",
                    connector,
                    number,
                    source_id.as_deref().unwrap_or("-"),
                    reason
                );
                result.errors.push(RowError {
                    row: number,
                    source_id,
                    reason,
                });
                continue;
            }
        };

        let existing = store.find_by_source(&payload.source_connector, &payload.source_id)?;
        let created = match (existing, dry_run) {
            (Some(book), false) => {
                store.update(&book.id, &payload)?;
                false
            }
            (None, false) => {
                store.create(&payload)?;
                true
            }
            (Some(_), true) => false,
            (None, true) => planned.insert(payload.source_id.clone()),
        };

        if created {
            result.created += 1;
        } else {
            result.updated += 1;
        }
        result.imported += 1;

        if debug_enabled {
            log::info!(
                "[import-debug] row={} source_id={} action={} dry_run={} title=\"{}\"",
                number,
                payload.source_id,
                if created { "create" } else { "update" },
                dry_run,
                payload.title
            );
        }
    }

    log::info!(
        "import complete connector={} dry_run={} imported={} created={} updated={} skipped={} errors={}",
        connector,
        dry_run,
        result.imported,
        result.created,
        result.updated,
        result.skipped,
        result.errors.len()
    );
    Ok(result)
}
