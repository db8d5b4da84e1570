use super::{Normalized, RecordNormalizer, SourceRow};
use crate::error::ImportError;
use crate::models::{BookPayload, ReadingStatus};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use regex::Regex;
use serde::Deserialize;
use std::io::Read;
use std::sync::OnceLock;

pub const CONNECTOR_NAME: &str = "goodreads";

const KNOWN_COLUMNS: &[&str] = &[
    "Book Id",
    "Title",
    "Author",
    "Additional Authors",
    "ISBN",
    "ISBN13",
    "My Rating",
    "Publisher",
    "Number of Pages",
    "Year Published",
    "Date Read",
    "Date Added",
    "Exclusive Shelf",
];

static ISBN_WRAPPER: OnceLock<Regex> = OnceLock::new();

/// One row of a Goodreads library export. Columns the importer does not use
/// (reviews, bookshelves, read count, ...) are ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GoodreadsRow {
    #[serde(rename = "Book Id")]
    pub book_id: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Author")]
    pub author: Option<String>,
    #[serde(rename = "Additional Authors")]
    pub additional_authors: Option<String>,
    #[serde(rename = "ISBN")]
    pub isbn: Option<String>,
    #[serde(rename = "ISBN13")]
    pub isbn13: Option<String>,
    #[serde(rename = "My Rating")]
    pub my_rating: Option<String>,
    #[serde(rename = "Publisher")]
    pub publisher: Option<String>,
    #[serde(rename = "Number of Pages")]
    pub number_of_pages: Option<String>,
    #[serde(rename = "Year Published")]
    pub year_published: Option<String>,
    #[serde(rename = "Date Read")]
    pub date_read: Option<String>,
    #[serde(rename = "Date Added")]
    pub date_added: Option<String>,
    #[serde(rename = "Exclusive Shelf")]
    pub exclusive_shelf: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GoodreadsNormalizer;

impl RecordNormalizer for GoodreadsNormalizer {
    type Row = GoodreadsRow;

    fn connector(&self) -> &'static str {
        CONNECTOR_NAME
    }

    fn normalize(&self, row: &GoodreadsRow) -> Normalized {
        normalize_row(row)
    }

    fn source_id<'a>(&self, row: &'a GoodreadsRow) -> Option<&'a str> {
        row.book_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Reads the export header and returns the data rows in file order.
///
/// An empty input yields no rows. A header that shares no column with the
/// Goodreads export is rejected, as is an unreadable header. Rows that fail to
/// decode are yielded as `SourceRow` errors; only I/O failures end the stream
/// with `Err`.
pub fn read_export<R: Read>(
    reader: R,
) -> Result<impl Iterator<Item = Result<SourceRow<GoodreadsRow>, ImportError>>, ImportError> {
    let mut csv_reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    if !headers.is_empty()
        && !headers
            .iter()
            .any(|header| KNOWN_COLUMNS.contains(&header.trim()))
    {
        return Err(ImportError::NotAnExport {
            connector: CONNECTOR_NAME,
        });
    }

    Ok(csv_reader
        .into_deserialize::<GoodreadsRow>()
        .enumerate()
        .map(|(index, item)| {
            let number = index + 1;
            match item {
                Ok(row) => Ok(SourceRow {
                    number,
                    record: Ok(row),
                }),
                Err(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => {
                    Err(ImportError::Read(err))
                }
                Err(err) => Ok(SourceRow {
                    number,
                    record: Err(format!("unreadable row: {}", err)),
                }),
            }
        }))
}

pub fn normalize_row(row: &GoodreadsRow) -> Normalized {
    let Some(title) = non_empty(row.title.as_deref()) else {
        return Normalized::Skip("missing title".to_string());
    };
    let Some(source_id) = non_empty(row.book_id.as_deref()) else {
        return Normalized::Skip("missing book id".to_string());
    };

    let isbn = match unwrap_isbn(row.isbn.as_deref()) {
        Ok(value) => value,
        Err(reason) => return Normalized::Error(reason),
    };
    let isbn13 = match unwrap_isbn(row.isbn13.as_deref()) {
        Ok(value) => value,
        Err(reason) => return Normalized::Error(reason),
    };

    Normalized::Book(BookPayload {
        title,
        authors: split_authors(row.author.as_deref(), row.additional_authors.as_deref()),
        isbn,
        isbn13,
        status: shelf_status(row.exclusive_shelf.as_deref()),
        rating: parse_rating(row.my_rating.as_deref()),
        publisher: non_empty(row.publisher.as_deref()),
        year_published: non_empty(row.year_published.as_deref())
            .and_then(|value| value.parse::<i32>().ok()),
        pages: non_empty(row.number_of_pages.as_deref())
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|pages| *pages > 0),
        date_read: parse_date(row.date_read.as_deref()),
        date_added: parse_date(row.date_added.as_deref()),
        source_connector: CONNECTOR_NAME.to_string(),
        source_id,
    })
}

/// Primary author first, then the comma separated additional authors.
pub fn split_authors(author: Option<&str>, additional: Option<&str>) -> Vec<String> {
    let mut authors: Vec<String> = vec![];
    let names = author
        .into_iter()
        .chain(additional.into_iter().flat_map(|value| value.split(',')));
    for name in names {
        let name = normalize_ws(name);
        if !name.is_empty() && !authors.contains(&name) {
            authors.push(name);
        }
    }
    authors
}

/// Strips the `="..."` wrapper spreadsheet exports put around ISBNs.
/// Returns `Ok(None)` for an absent or empty value and `Err` when what is left
/// is not an ISBN-shaped string.
pub fn unwrap_isbn(raw: Option<&str>) -> Result<Option<String>, String> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    let wrapper = ISBN_WRAPPER
        .get_or_init(|| Regex::new(r#"^=?"(.*)"$"#).expect("isbn wrapper pattern"));
    let inner = wrapper
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
        .map(|value| value.as_str())
        .unwrap_or(trimmed)
        .trim();
    if inner.is_empty() {
        return Ok(None);
    }
    let well_formed = inner
        .chars()
        .all(|ch| ch.is_ascii_digit() || ch == '-' || ch == ' ' || ch == 'X' || ch == 'x');
    if !well_formed || !inner.chars().any(|ch| ch.is_ascii_digit()) {
        return Err(format!("malformed isbn: {:?}", raw));
    }
    Ok(Some(inner.to_string()))
}

pub fn shelf_status(shelf: Option<&str>) -> ReadingStatus {
    match shelf.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
        Some("read") => ReadingStatus::Read,
        Some("currently-reading") => ReadingStatus::Reading,
        Some("to-read") => ReadingStatus::WantToRead,
        _ => ReadingStatus::None,
    }
}

/// Goodreads writes `0` for unrated books.
pub fn parse_rating(raw: Option<&str>) -> Option<u8> {
    match raw?.trim().parse::<i64>().ok()? {
        value @ 1..=5 => Some(value as u8),
        _ => None,
    }
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let value = non_empty(raw)?;
    NaiveDate::parse_from_str(&value, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(&value, "%Y-%m-%d"))
        .ok()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn normalize_ws(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
