//! SQLite Storage Implementation
//!
//! Word table access for the API, the CLI and the review scheduler.

use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::WordStore;
use crate::schedule::{initial_review_at, ReviewUpdate};
use crate::word::{ValidationError, Word, WordInput, WordStats, WordStatus};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Word not found
    #[error("Word not found: {0}")]
    NotFound(i64),
    /// A word with the same text already exists
    #[error("Word already exists: {0}")]
    Duplicate(String),
    /// Input failed validation
    #[error("Invalid word: {0}")]
    Invalid(#[from] ValidationError),
    /// Some entries of a bulk import failed validation
    #[error("{invalid} of {total} entries are invalid")]
    InvalidBatch { invalid: usize, total: usize },
    /// Word changed between read and conditional write
    #[error("Word was modified concurrently: {0}")]
    Conflict(i64),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Result of a bulk import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Rows inserted
    pub imported: usize,
    /// Entries whose word text already existed
    pub skipped: usize,
}

// ============================================================================
// STORAGE
// ============================================================================

/// SQLite word store
///
/// Uses separate reader/writer connections for interior mutability.
/// All methods take `&self`, making Storage `Send + Sync` so the HTTP layer
/// can share an `Arc<Storage>`.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    path: PathBuf,
}

impl Storage {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -16000;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Default database location in the platform data directory
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "lexicon", "lexicon").ok_or_else(|| {
            StorageError::Init("Could not determine project directories".to_string())
        })?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join("lexicon.db"))
    }

    /// Open (or create) the store, applying pending migrations
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => {
                if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                p
            }
            None => Self::default_path()?,
        };

        // Open writer connection
        let writer_conn = Connection::open(&path)?;
        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        let applied = super::migrations::apply_migrations(&writer_conn)?;
        if applied > 0 {
            tracing::info!(applied, path = %path.display(), "Database schema up to date");
        }

        // Open reader connection to same path
        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            path,
        })
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))
    }

    fn reader(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))
    }

    // ========================================================================
    // TIMESTAMPS
    // ========================================================================

    /// Fixed-width RFC 3339 so that text comparison in SQL is time order
    fn format_timestamp(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Parse RFC3339 timestamp
    fn parse_timestamp(value: &str, field_name: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Invalid {} timestamp '{}': {}", field_name, value, e),
                    )),
                )
            })
    }

    fn parse_optional_timestamp(
        value: Option<String>,
        field_name: &str,
    ) -> rusqlite::Result<Option<DateTime<Utc>>> {
        value
            .map(|s| Self::parse_timestamp(&s, field_name))
            .transpose()
    }

    /// Convert a row to Word
    fn row_to_word(row: &rusqlite::Row) -> rusqlite::Result<Word> {
        let status: String = row.get("status")?;
        let created_at: String = row.get("created_at")?;
        let updated_at: String = row.get("updated_at")?;

        Ok(Word {
            id: row.get("id")?,
            word: row.get("word")?,
            definition: row.get("definition")?,
            example: row.get("example")?,
            status: WordStatus::parse_name(&status),
            memory_stage: row.get("memory_stage")?,
            review_count: row.get("review_count")?,
            last_review: Self::parse_optional_timestamp(row.get("last_review")?, "last_review")?,
            next_review_at: Self::parse_optional_timestamp(row.get("next_review_at")?, "next_review_at")?,
            created_at: Self::parse_timestamp(&created_at, "created_at")?,
            updated_at: Self::parse_timestamp(&updated_at, "updated_at")?,
        })
    }

    fn is_unique_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
        )
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// Create a new word, scheduled one stage-0 interval from `now`
    pub fn create_word(&self, input: WordInput, now: DateTime<Utc>) -> Result<Word> {
        let input = input.normalized()?;
        let now_str = Self::format_timestamp(&now);
        let next_review = Self::format_timestamp(&initial_review_at(now));

        let id = {
            let writer = self.writer()?;
            let exists = writer
                .query_row(
                    "SELECT 1 FROM words WHERE word = ?1",
                    params![input.word],
                    |_| Ok(()),
                )
                .optional()?;
            if exists.is_some() {
                return Err(StorageError::Duplicate(input.word));
            }

            writer
                .execute(
                    "INSERT INTO words (
                        word, definition, example, status, memory_stage, review_count,
                        last_review, next_review_at, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, 0, 0, NULL, ?5, ?6, ?7)",
                    params![
                        input.word,
                        input.definition,
                        input.example,
                        WordStatus::New.as_str(),
                        next_review,
                        now_str,
                        now_str,
                    ],
                )
                .map_err(|e| {
                    if Self::is_unique_violation(&e) {
                        StorageError::Duplicate(input.word.clone())
                    } else {
                        StorageError::Database(e)
                    }
                })?;
            writer.last_insert_rowid()
        };

        tracing::info!(word_id = id, word = %input.word, "Word created");

        self.get_word(id)?.ok_or(StorageError::NotFound(id))
    }

    /// Get a word by id
    pub fn get_word(&self, id: i64) -> Result<Option<Word>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM words WHERE id = ?1")?;

        let word = stmt
            .query_row(params![id], |row| Self::row_to_word(row))
            .optional()?;
        Ok(word)
    }

    /// All words, newest first
    pub fn list_words(&self) -> Result<Vec<Word>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM words ORDER BY id DESC")?;

        let words = stmt.query_map([], |row| Self::row_to_word(row))?;

        let mut result = Vec::new();
        for word in words {
            result.push(word?);
        }
        Ok(result)
    }

    /// Replace the text fields of a word. Scheduling state is untouched.
    pub fn update_word(&self, id: i64, input: WordInput, now: DateTime<Utc>) -> Result<Word> {
        let input = input.normalized()?;

        let changed = {
            let writer = self.writer()?;
            writer
                .execute(
                    "UPDATE words SET word = ?1, definition = ?2, example = ?3, updated_at = ?4
                     WHERE id = ?5",
                    params![
                        input.word,
                        input.definition,
                        input.example,
                        Self::format_timestamp(&now),
                        id,
                    ],
                )
                .map_err(|e| {
                    if Self::is_unique_violation(&e) {
                        StorageError::Duplicate(input.word.clone())
                    } else {
                        StorageError::Database(e)
                    }
                })?
        };

        if changed == 0 {
            return Err(StorageError::NotFound(id));
        }

        tracing::info!(word_id = id, word = %input.word, "Word updated");

        self.get_word(id)?.ok_or(StorageError::NotFound(id))
    }

    /// Delete a word
    pub fn delete_word(&self, id: i64) -> Result<bool> {
        let writer = self.writer()?;
        let rows = writer.execute("DELETE FROM words WHERE id = ?1", params![id])?;
        if rows > 0 {
            tracing::info!(word_id = id, "Word deleted");
        }
        Ok(rows > 0)
    }

    /// Delete every word, returning how many were removed
    pub fn delete_all_words(&self) -> Result<usize> {
        let writer = self.writer()?;
        let rows = writer.execute("DELETE FROM words", [])?;
        tracing::info!(deleted = rows, "All words deleted");
        Ok(rows)
    }

    /// Insert many words in one transaction.
    ///
    /// Every entry is validated before anything is written; a single invalid
    /// entry rejects the whole batch. Entries whose text already exists (in
    /// the store or earlier in the batch) are skipped.
    pub fn import_words(&self, inputs: &[WordInput], now: DateTime<Utc>) -> Result<ImportReport> {
        let mut clean = Vec::with_capacity(inputs.len());
        let mut invalid = 0;
        for input in inputs {
            match input.normalized() {
                Ok(c) => clean.push(c),
                Err(_) => invalid += 1,
            }
        }
        if invalid > 0 {
            return Err(StorageError::InvalidBatch {
                invalid,
                total: inputs.len(),
            });
        }

        let now_str = Self::format_timestamp(&now);
        let next_review = Self::format_timestamp(&initial_review_at(now));
        let mut report = ImportReport::default();

        {
            let mut writer = self.writer()?;
            let tx = writer.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT OR IGNORE INTO words (
                        word, definition, example, status, memory_stage, review_count,
                        last_review, next_review_at, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, 0, 0, NULL, ?5, ?6, ?7)",
                )?;
                for input in &clean {
                    let rows = stmt.execute(params![
                        input.word,
                        input.definition,
                        input.example,
                        WordStatus::New.as_str(),
                        next_review,
                        now_str,
                        now_str,
                    ])?;
                    if rows > 0 {
                        report.imported += 1;
                    } else {
                        report.skipped += 1;
                    }
                }
            }
            tx.commit()?;
        }

        tracing::info!(
            imported = report.imported,
            skipped = report.skipped,
            "Import complete"
        );
        Ok(report)
    }

    // ========================================================================
    // STATS & MAINTENANCE
    // ========================================================================

    /// Aggregate counts at `now`
    pub fn get_stats(&self, now: DateTime<Utc>) -> Result<WordStats> {
        let now = Self::format_timestamp(&now);
        let reader = self.reader()?;

        let (total, total_reviews): (i64, i64) = reader.query_row(
            "SELECT COUNT(*), COALESCE(SUM(review_count), 0) FROM words",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let due: i64 = reader.query_row(
            "SELECT COUNT(*) FROM words WHERE next_review_at <= ?1 OR next_review_at IS NULL",
            params![now],
            |row| row.get(0),
        )?;

        let mut stats = WordStats {
            total_words: total,
            due_for_review: due,
            total_reviews,
            ..Default::default()
        };

        let mut stmt = reader.prepare("SELECT status, COUNT(*) FROM words GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (status, count) = row?;
            match WordStatus::parse_name(&status) {
                WordStatus::New => stats.new += count,
                WordStatus::Learning => stats.learning += count,
                WordStatus::Review => stats.review += count,
                WordStatus::Mastered => stats.mastered += count,
            }
        }

        Ok(stats)
    }

    /// Create a consistent backup using VACUUM INTO
    pub fn backup_to(&self, path: &Path) -> Result<()> {
        let path_str = path
            .to_str()
            .ok_or_else(|| StorageError::Init("Invalid backup path encoding".to_string()))?;
        if path_str.bytes().any(|b| b < 0x20 && b != b'\t') {
            return Err(StorageError::Init(
                "Backup path contains invalid characters".to_string(),
            ));
        }
        let reader = self.reader()?;
        // VACUUM INTO doesn't support parameterized queries; escape single quotes
        reader.execute_batch(&format!("VACUUM INTO '{}'", path_str.replace('\'', "''")))?;
        tracing::info!(path = %path.display(), "Backup written");
        Ok(())
    }
}

// ============================================================================
// WORD STORE
// ============================================================================

impl WordStore for Storage {
    fn get_word(&self, id: i64) -> Result<Option<Word>> {
        Storage::get_word(self, id)
    }

    fn update_review_fields(&self, current: &Word, update: &ReviewUpdate) -> Result<()> {
        let writer = self.writer()?;
        let rows = writer.execute(
            "UPDATE words SET
                last_review = ?1,
                next_review_at = ?2,
                memory_stage = ?3,
                review_count = ?4,
                status = ?5
            WHERE id = ?6 AND memory_stage = ?7 AND review_count = ?8 AND last_review IS ?9",
            params![
                Self::format_timestamp(&update.last_review),
                Self::format_timestamp(&update.next_review_at),
                update.memory_stage,
                update.review_count,
                update.status.as_str(),
                current.id,
                current.memory_stage,
                current.review_count,
                current.last_review.as_ref().map(Self::format_timestamp),
            ],
        )?;

        if rows > 0 {
            return Ok(());
        }

        let exists = writer
            .query_row(
                "SELECT 1 FROM words WHERE id = ?1",
                params![current.id],
                |_| Ok(()),
            )
            .optional()?;
        match exists {
            Some(()) => Err(StorageError::Conflict(current.id)),
            None => Err(StorageError::NotFound(current.id)),
        }
    }

    fn select_due_for_review(&self, now: DateTime<Utc>, limit: i32) -> Result<Vec<Word>> {
        let now = Self::format_timestamp(&now);

        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT * FROM words
             WHERE next_review_at <= ?1 OR next_review_at IS NULL
             ORDER BY RANDOM()
             LIMIT ?2",
        )?;

        let words = stmt.query_map(params![now, limit.max(0)], |row| Self::row_to_word(row))?;

        let mut result = Vec::new();
        for word in words {
            result.push(word?);
        }
        Ok(result)
    }
}

// ============================================================================
// TESTS
// ============================================================================
