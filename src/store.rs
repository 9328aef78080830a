//! Persistent word store for `wordflash analyze --db`.
//!
//! A SQLite file that collects words across vocabulary lists. Each word is
//! one row keyed by [`word_key`]; loading a record whose key already exists
//! merges it into the row the same way [`crate::analyze::merge_words`] merges
//! records within one list. Categories are kept as a JSON array.
//!
//! ```text
//! words
//! ├── word_key     hund:dog (unique)
//! ├── source, target, gender, plural, notes
//! ├── categories   ["animals","pets"]
//! └── created_at, updated_at
//! ```

use crate::analyze::{merge_into, word_key};
use crate::loader::WordRecord;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

type Result<T> = std::result::Result<T, StoreError>;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS words (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    word_key TEXT NOT NULL UNIQUE,
    source TEXT NOT NULL,
    target TEXT NOT NULL,
    gender TEXT,
    plural TEXT,
    categories TEXT NOT NULL DEFAULT '[]',
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

const WORD_COLUMNS: &str = "source, target, gender, plural, categories, notes";

/// What happened to one record on upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Upsert {
    Added,
    Merged,
    /// Missing a source or target; not stored.
    Skipped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub added: usize,
    pub merged: usize,
    pub skipped: usize,
}

pub struct WordStore {
    conn: Connection,
}

impl WordStore {
    /// Open the store at `path`, creating the file and its parent directory.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Add or merge every record in one transaction.
    pub fn upsert_all(&mut self, words: &[WordRecord]) -> Result<UpsertSummary> {
        let tx = self.conn.transaction()?;
        let mut summary = UpsertSummary::default();
        for word in words {
            match upsert(&tx, word)? {
                Upsert::Added => summary.added += 1,
                Upsert::Merged => summary.merged += 1,
                Upsert::Skipped => summary.skipped += 1,
            }
        }
        tx.commit()?;
        log::debug!(
            "Word store: {} added, {} merged, {} skipped",
            summary.added,
            summary.merged,
            summary.skipped
        );
        Ok(summary)
    }

    /// All stored words in insertion order.
    pub fn words(&self) -> Result<Vec<WordRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {WORD_COLUMNS} FROM words ORDER BY id"))?;
        let words = stmt
            .query_map([], word_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(words)
    }

    pub fn word_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn upsert(conn: &Connection, word: &WordRecord) -> Result<Upsert> {
    if !word.is_complete() {
        return Ok(Upsert::Skipped);
    }
    let key = word_key(word);
    let now = Utc::now().to_rfc3339();
    match find(conn, &key)? {
        Some(mut existing) => {
            merge_into(&mut existing, word);
            conn.execute(
                "UPDATE words SET gender = ?1, plural = ?2, categories = ?3, notes = ?4, updated_at = ?5
                 WHERE word_key = ?6",
                params![
                    existing.gender,
                    existing.plural,
                    serde_json::to_string(&existing.categories)?,
                    existing.notes,
                    now,
                    key
                ],
            )?;
            Ok(Upsert::Merged)
        }
        None => {
            conn.execute(
                "INSERT INTO words (word_key, source, target, gender, plural, categories, notes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                params![
                    key,
                    word.source,
                    word.target,
                    word.gender,
                    word.plural,
                    serde_json::to_string(&word.categories)?,
                    word.notes,
                    now
                ],
            )?;
            Ok(Upsert::Added)
        }
    }
}

fn find(conn: &Connection, key: &str) -> Result<Option<WordRecord>> {
    let word = conn
        .query_row(
            &format!("SELECT {WORD_COLUMNS} FROM words WHERE word_key = ?1"),
            params![key],
            word_from_row,
        )
        .optional()?;
    Ok(word)
}

fn word_from_row(row: &Row<'_>) -> rusqlite::Result<WordRecord> {
    let categories: String = row.get(4)?;
    let categories = serde_json::from_str(&categories)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    Ok(WordRecord {
        source: row.get(0)?,
        target: row.get(1)?,
        gender: row.get(2)?,
        plural: row.get(3)?,
        categories,
        notes: row.get(5)?,
    })
}
