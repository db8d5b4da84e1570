pub mod goodreads;

use crate::models::BookPayload;

/// What a connector made of one source row.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Book(BookPayload),
    /// Row is incomplete (a required field is empty). Not a failure.
    Skip(String),
    /// Row is present but malformed.
    Error(String),
}

pub trait RecordNormalizer {
    type Row;

    /// Name stored as `source_connector` on every book this normalizer produces.
    fn connector(&self) -> &'static str;

    fn normalize(&self, row: &Self::Row) -> Normalized;

    /// External id of a row, when it has one. Used to label row errors.
    fn source_id<'a>(&self, row: &'a Self::Row) -> Option<&'a str>;
}

/// A data row as read from the export, numbered from 1 after the header.
/// `record` is an error description when the row could not be decoded at all.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow<R> {
    pub number: usize,
    pub record: Result<R, String>,
}
