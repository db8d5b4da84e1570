use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    WantToRead,
    Reading,
    Read,
    Dnf,
    #[default]
    None,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "want_to_read",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Read => "read",
            ReadingStatus::Dnf => "dnf",
            ReadingStatus::None => "none",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "want_to_read" => Ok(ReadingStatus::WantToRead),
            "reading" => Ok(ReadingStatus::Reading),
            "read" => Ok(ReadingStatus::Read),
            "dnf" => Ok(ReadingStatus::Dnf),
            "none" => Ok(ReadingStatus::None),
            other => Err(format!("unknown reading status: {}", other)),
        }
    }
}

/// Fields of a book as produced by a connector, before the store assigns identity.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BookPayload {
    pub title: String,
    pub authors: Vec<String>,
    pub isbn: Option<String>,
    pub isbn13: Option<String>,
    pub status: ReadingStatus,
    pub rating: Option<u8>, // 1..=5
    pub publisher: Option<String>,
    pub year_published: Option<i32>,
    pub pages: Option<u32>,
    pub date_read: Option<NaiveDate>,
    pub date_added: Option<NaiveDate>,
    pub source_connector: String,
    pub source_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Book {
    pub id: String, // UUID
    pub title: String,
    pub authors: Vec<String>,
    pub isbn: Option<String>,
    pub isbn13: Option<String>,
    pub status: ReadingStatus,
    pub rating: Option<u8>,
    pub publisher: Option<String>,
    pub year_published: Option<i32>,
    pub pages: Option<u32>,
    pub date_read: Option<NaiveDate>,
    pub date_added: Option<NaiveDate>,
    pub source_connector: String,
    pub source_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn from_payload(
        id: String,
        payload: &BookPayload,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Book {
            id,
            title: payload.title.clone(),
            authors: payload.authors.clone(),
            isbn: payload.isbn.clone(),
            isbn13: payload.isbn13.clone(),
            status: payload.status,
            rating: payload.rating,
            publisher: payload.publisher.clone(),
            year_published: payload.year_published,
            pages: payload.pages,
            date_read: payload.date_read,
            date_added: payload.date_added,
            source_connector: payload.source_connector.clone(),
            source_id: payload.source_id.clone(),
            created_at,
            updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub status: Option<ReadingStatus>,
    pub rating: Option<u8>,
    pub limit: Option<usize>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(status) = self.status {
            if book.status != status {
                return false;
            }
        }
        if let Some(rating) = self.rating {
            if book.rating != Some(rating) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based data row number (the header is not counted).
    pub row: usize,
    pub source_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub imported: u64,
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub errors: Vec<RowError>,
}
