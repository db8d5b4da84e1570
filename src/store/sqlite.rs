use super::BookStore;
use crate::db;
use crate::error::StoreError;
use crate::models::{Book, BookFilter, BookPayload, ReadingStatus};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";
const BOOK_COLUMNS: &str = "id, title, authors, isbn, isbn13, status, rating, publisher, \
     year_published, pages, date_read, date_added, source_connector, source_id, created_at, updated_at";

pub struct SqliteBookStore {
    conn: Connection,
}

/// Column values as stored, before text-encoded fields are decoded.
struct BookRow {
    id: String,
    title: String,
    authors: String,
    isbn: Option<String>,
    isbn13: Option<String>,
    status: String,
    rating: Option<i64>,
    publisher: Option<String>,
    year_published: Option<i32>,
    pages: Option<i64>,
    date_read: Option<String>,
    date_added: Option<String>,
    source_connector: String,
    source_id: String,
    created_at: i64,
    updated_at: i64,
}

impl SqliteBookStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            conn: db::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: db::open_in_memory()?,
        })
    }

    fn query_one(&self, clause: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Option<Book>, StoreError> {
        let sql = format!("SELECT {} FROM books WHERE {}", BOOK_COLUMNS, clause);
        let row = self
            .conn
            .query_row(&sql, args, read_row)
            .optional()?;
        row.map(decode_row).transpose()
    }
}

impl BookStore for SqliteBookStore {
    fn find_by_source(
        &self,
        source_connector: &str,
        source_id: &str,
    ) -> Result<Option<Book>, StoreError> {
        self.query_one(
            "source_connector = ?1 AND source_id = ?2",
            &[&source_connector, &source_id],
        )
    }

    fn create(&mut self, payload: &BookPayload) -> Result<Book, StoreError> {
        let now = now_millis();
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO books (id, title, authors, isbn, isbn13, status, rating, publisher,
                year_published, pages, date_read, date_added, source_connector, source_id,
                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15)",
            params![
                id,
                payload.title,
                serde_json::to_string(&payload.authors)?,
                payload.isbn,
                payload.isbn13,
                payload.status.as_str(),
                payload.rating,
                payload.publisher,
                payload.year_published,
                payload.pages,
                format_date(payload.date_read),
                format_date(payload.date_added),
                payload.source_connector,
                payload.source_id,
                now,
            ],
        )?;
        self.get(&id)?.ok_or(StoreError::NotFound(id))
    }

    fn update(&mut self, id: &str, payload: &BookPayload) -> Result<Book, StoreError> {
        let changed = self.conn.execute(
            "UPDATE books SET title = ?2, authors = ?3, isbn = ?4, isbn13 = ?5, status = ?6,
                rating = ?7, publisher = ?8, year_published = ?9, pages = ?10, date_read = ?11,
                date_added = ?12, source_connector = ?13, source_id = ?14, updated_at = ?15
             WHERE id = ?1",
            params![
                id,
                payload.title,
                serde_json::to_string(&payload.authors)?,
                payload.isbn,
                payload.isbn13,
                payload.status.as_str(),
                payload.rating,
                payload.publisher,
                payload.year_published,
                payload.pages,
                format_date(payload.date_read),
                format_date(payload.date_added),
                payload.source_connector,
                payload.source_id,
                now_millis(),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.get(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn get(&self, id: &str) -> Result<Option<Book>, StoreError> {
        self.query_one("id = ?1", &[&id])
    }

    fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, StoreError> {
        let mut clauses: Vec<&str> = vec![];
        let mut args: Vec<Value> = vec![];
        if let Some(status) = filter.status {
            clauses.push("status = ?");
            args.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(rating) = filter.rating {
            clauses.push("rating = ?");
            args.push(Value::Integer(i64::from(rating)));
        }
        let mut sql = format!("SELECT {} FROM books", BOOK_COLUMNS);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY updated_at DESC, rowid DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            args.push(Value::Integer(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args), read_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(decode_row).collect()
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM books WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<BookRow> {
    Ok(BookRow {
        id: row.get(0)?,
        title: row.get(1)?,
        authors: row.get(2)?,
        isbn: row.get(3)?,
        isbn13: row.get(4)?,
        status: row.get(5)?,
        rating: row.get(6)?,
        publisher: row.get(7)?,
        year_published: row.get(8)?,
        pages: row.get(9)?,
        date_read: row.get(10)?,
        date_added: row.get(11)?,
        source_connector: row.get(12)?,
        source_id: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

fn decode_row(row: BookRow) -> Result<Book, StoreError> {
    let corrupt = |reason: String| StoreError::Corrupt {
        id: row.id.clone(),
        reason,
    };
    let status = row.status.parse::<ReadingStatus>().map_err(&corrupt)?;
    let rating = match row.rating {
        None => None,
        Some(value @ 1..=5) => Some(value as u8),
        Some(value) => return Err(corrupt(format!("rating out of range: {}", value))),
    };
    let pages = row
        .pages
        .map(|value| u32::try_from(value).map_err(|_| corrupt(format!("bad page count: {}", value))))
        .transpose()?;
    let date_read = parse_date(row.date_read.as_deref()).map_err(&corrupt)?;
    let date_added = parse_date(row.date_added.as_deref()).map_err(&corrupt)?;
    let created_at = from_millis(row.created_at).ok_or_else(|| corrupt("bad created_at".to_string()))?;
    let updated_at = from_millis(row.updated_at).ok_or_else(|| corrupt("bad updated_at".to_string()))?;
    let authors: Vec<String> = serde_json::from_str(&row.authors)?;

    Ok(Book {
        id: row.id,
        title: row.title,
        authors,
        isbn: row.isbn,
        isbn13: row.isbn13,
        status,
        rating,
        publisher: row.publisher,
        year_published: row.year_published,
        pages,
        date_read,
        date_added,
        source_connector: row.source_connector,
        source_id: row.source_id,
        created_at,
        updated_at,
    })
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn from_millis(value: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(value)
}

fn format_date(value: Option<NaiveDate>) -> Option<String> {
    value.map(|date| date.format(DATE_FORMAT).to_string())
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, String> {
    value
        .map(|raw| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map_err(|err| format!("bad date {:?}: {}", raw, err))
        })
        .transpose()
}
