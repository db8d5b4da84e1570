use shelf_import::{
    import, BookFilter, BookStore, ImportError, InMemoryBookStore, ReadingStatus,
    SqliteBookStore,
};
use std::io::Write;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn dry_run_reports_rows_without_writing() {
    let mut store = InMemoryBookStore::new();
    let result = import(&mut store, "goodreads", &fixture("sample-export.csv"), true).unwrap();

    assert_eq!(result.imported, 3);
    assert!(result.errors.is_empty());
    assert!(store.is_empty());
    assert_eq!(store.writes(), 0);
}

#[test]
fn real_run_maps_every_field() {
    let mut store = InMemoryBookStore::new();
    let result = import(&mut store, "goodreads", &fixture("sample-export.csv"), false).unwrap();
    assert_eq!(result.imported, 3);
    assert_eq!(result.created, 3);

    let gatsby = store.find_by_source("goodreads", "12345").unwrap().unwrap();
    assert_eq!(gatsby.source_connector, "goodreads");
    assert_eq!(gatsby.title, "[TEST] The Great Gatsby");
    assert!(gatsby.authors.contains(&"F. Scott Fitzgerald".to_string()));
    assert_eq!(gatsby.isbn.as_deref(), Some("0743273567"));
    assert_eq!(gatsby.status, ReadingStatus::Read);
    assert_eq!(gatsby.rating, Some(5));

    let omens = store.find_by_source("goodreads", "12346").unwrap().unwrap();
    assert_eq!(omens.status, ReadingStatus::Reading);
    assert_eq!(omens.authors, vec!["Terry Pratchett", "Neil Gaiman"]);

    let dune = store.find_by_source("goodreads", "12347").unwrap().unwrap();
    assert_eq!(dune.status, ReadingStatus::WantToRead);
    assert_eq!(dune.rating, None);
    assert_eq!(dune.isbn, None);
}

#[test]
fn reimport_updates_in_place() {
    let mut store = InMemoryBookStore::new();
    import(&mut store, "goodreads", &fixture("sample-export.csv"), false).unwrap();
    let second = import(&mut store, "goodreads", &fixture("sample-export.csv"), false).unwrap();

    assert_eq!(second.imported, 3);
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 3);
    assert_eq!(store.books_with_source_id("12345").len(), 1);
    assert_eq!(store.len(), 3);
}

#[test]
fn dry_and_real_runs_agree_on_counts() {
    let mut store = InMemoryBookStore::new();
    let path = fixture("missing-fields.csv");

    let dry = import(&mut store, "goodreads", &path, true).unwrap();
    assert!(store.is_empty());
    let real = import(&mut store, "goodreads", &path, false).unwrap();

    assert_eq!(dry, real);
    assert_eq!(store.len(), 1);
}

#[test]
fn rows_without_title_are_skipped() {
    let mut store = InMemoryBookStore::new();
    let result = import(&mut store, "goodreads", &fixture("missing-fields.csv"), false).unwrap();

    assert_eq!(result.skipped, 2);
    assert_eq!(result.imported, 1);
    assert!(result.errors.is_empty());
    assert!(store.find_by_source("goodreads", "22345").unwrap().is_none());
    assert!(store.find_by_source("goodreads", "22346").unwrap().is_none());
}

#[test]
fn rows_without_ids_are_all_skipped() {
    let mut store = InMemoryBookStore::new();
    let result = import(&mut store, "goodreads", &fixture("missing-ids.csv"), false).unwrap();

    assert_eq!(result.imported, 0);
    assert_eq!(result.skipped, 2);
    assert!(result.errors.is_empty());
    assert!(store.is_empty());
}

#[test]
fn empty_file_imports_nothing() {
    let mut store = InMemoryBookStore::new();
    for dry_run in [true, false] {
        let result = import(&mut store, "goodreads", &fixture("empty.csv"), dry_run).unwrap();
        assert_eq!(result.imported, 0);
        assert_eq!(result.skipped, 0);
        assert!(result.errors.is_empty());
    }
}

#[test]
fn malformed_rows_are_errors_and_the_rest_imports() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"Book Id,Title,Author,ISBN,My Rating,Exclusive Shelf\n").unwrap();
    file.write_all(b"1,Valid One,Someone,,3,read\n").unwrap();
    file.write_all(b"2,Bad \xff\xfe Bytes,Someone,,3,read\n").unwrap();
    file.write_all(b"3,Too,Many,Fields,In,This,Row\n").unwrap();
    file.write_all(b"4,Valid Two,Someone,\"=\"\"123-456\"\"\",0,to-read\n").unwrap();
    file.flush().unwrap();

    let mut store = InMemoryBookStore::new();
    let result = import(&mut store, "goodreads", file.path(), false).unwrap();

    assert_eq!(result.imported, 2);
    assert_eq!(result.skipped, 0);
    let rows = result.errors.iter().map(|error| error.row).collect::<Vec<_>>();
    assert_eq!(rows, vec![2, 3]);
    assert_eq!(
        store.find_by_source("goodreads", "4").unwrap().unwrap().isbn.as_deref(),
        Some("123-456")
    );
}

#[test]
fn missing_file_is_fatal() {
    let mut store = InMemoryBookStore::new();
    let err = import(&mut store, "goodreads", &fixture("does-not-exist.csv"), false).unwrap_err();
    assert!(matches!(err, ImportError::Open { .. }));
}

#[test]
fn unknown_connector_is_fatal() {
    let mut store = InMemoryBookStore::new();
    let err = import(&mut store, "librarything", &fixture("sample-export.csv"), true).unwrap_err();
    assert!(matches!(err, ImportError::UnknownConnector(name) if name == "librarything"));
}

#[test]
fn non_export_file_is_fatal() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"sku,price\nA-1,9.99\n").unwrap();
    file.flush().unwrap();

    let mut store = InMemoryBookStore::new();
    let err = import(&mut store, "goodreads", file.path(), false).unwrap_err();
    assert!(matches!(err, ImportError::NotAnExport { .. }));
}

#[test]
fn sqlite_library_survives_reopen_and_reimport() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("shelf.db");

    {
        let mut store = SqliteBookStore::open(&db_path).unwrap();
        let result = import(&mut store, "goodreads", &fixture("sample-export.csv"), false).unwrap();
        assert_eq!(result.created, 3);
    }

    let mut store = SqliteBookStore::open(&db_path).unwrap();
    let before = store
        .find_by_source("goodreads", "12345")
        .unwrap()
        .expect("expected imported book");

    let dry = import(&mut store, "goodreads", &fixture("sample-export.csv"), true).unwrap();
    assert_eq!((dry.created, dry.updated), (0, 3));
    let unchanged = store.find_by_source("goodreads", "12345").unwrap().unwrap();
    assert_eq!(unchanged.updated_at, before.updated_at);

    let again = import(&mut store, "goodreads", &fixture("sample-export.csv"), false).unwrap();
    assert_eq!(again.updated, 3);

    let all = store.list(&BookFilter::default()).unwrap();
    assert_eq!(all.len(), 3);
    for book in &all {
        assert_eq!(book.source_connector, "goodreads");
        assert!(!book.source_id.is_empty());
        assert!(book.rating.map_or(true, |rating| (1..=5).contains(&rating)));
    }
    let after = store.find_by_source("goodreads", "12345").unwrap().unwrap();
    assert_eq!(after.id, before.id);
}
