//! SQLite store over the `legal_resources` table.

use std::path::{Path, PathBuf};

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags, Row};
use tracing::{debug, warn};

use super::{DocumentStore, StoreError, normalize_records};
use crate::model::types::{Document, RawRecord, RecordId, Year, parse_tag_text};

const SELECT_RESOURCES: &str = "SELECT resource_id, title, content, summary, tags, type, \
     jurisdiction, year, citation \
     FROM legal_resources \
     WHERE content IS NOT NULL \
     ORDER BY rowid";

#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_readonly(&self) -> Result<Connection, StoreError> {
        if !self.path.is_file() {
            return Err(StoreError::NotFound(self.path.clone()));
        }
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }
}

impl DocumentStore for SqliteStore {
    fn name(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    fn load(&self) -> Result<Vec<Document>, StoreError> {
        let conn = self.open_readonly()?;
        let mut stmt = conn.prepare(SELECT_RESOURCES)?;
        let rows = stmt.query_map([], record_from_row)?;
        let mut raw = Vec::new();
        for (index, r) in rows.enumerate() {
            match r {
                Ok(record) => raw.push(record),
                Err(e) => {
                    warn!(path = %self.path.display(), row = index + 1, error = %e, "unreadable row");
                    // Placeholder keeps later rows at their positions; it is dropped as invalid.
                    raw.push(RawRecord::default());
                }
            }
        }
        debug!(path = %self.path.display(), rows = raw.len(), "read legal_resources");
        Ok(normalize_records(&self.name(), raw))
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<RawRecord> {
    let tags = text(row.get(4)?);
    Ok(RawRecord {
        id: None,
        resource_id: record_id(row.get(0)?),
        title: text(row.get(1)?),
        content: text(row.get(2)?),
        summary: text(row.get(3)?),
        tags: tags.as_deref().map(parse_tag_text).unwrap_or_default(),
        year: year(row.get(7)?),
        jurisdiction: text(row.get(6)?),
        doc_type: text(row.get(5)?),
        citation: text(row.get(8)?),
    })
}

fn record_id(value: SqlValue) -> Option<RecordId> {
    match value {
        SqlValue::Integer(v) => Some(RecordId::Int(v)),
        SqlValue::Text(v) => Some(RecordId::Text(v)),
        _ => None,
    }
}

fn year(value: SqlValue) -> Year {
    match value {
        SqlValue::Integer(v) => Year::from(Some(v)),
        SqlValue::Real(v) if v.fract() == 0.0 => Year::from(Some(v as i64)),
        SqlValue::Text(v) => Year::parse(&v),
        _ => Year::Unknown,
    }
}

/// Text columns may hold numbers in loosely typed tables.
fn text(value: SqlValue) -> Option<String> {
    match value {
        SqlValue::Text(v) => Some(v),
        SqlValue::Integer(v) => Some(v.to_string()),
        SqlValue::Real(v) => Some(v.to_string()),
        SqlValue::Null | SqlValue::Blob(_) => None,
    }
}
