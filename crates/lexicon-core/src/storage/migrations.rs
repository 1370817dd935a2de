//! Database Migrations
//!
//! Schema migration definitions for the storage layer.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial words schema with review scheduling columns",
        up: MIGRATION_V1_UP,
        discards: None,
    },
    Migration {
        version: 2,
        description: "Unique index on word text",
        up: MIGRATION_V2_UP,
        discards: Some(MIGRATION_V2_DISCARDS),
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
    /// Counts the rows `up` deletes, for migrations that drop data
    pub discards: Option<&'static str>,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS words (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    word TEXT NOT NULL,
    definition TEXT NOT NULL,
    example TEXT,

    -- Review scheduling
    status TEXT NOT NULL DEFAULT 'new',
    memory_stage INTEGER NOT NULL DEFAULT 0,
    review_count INTEGER NOT NULL DEFAULT 0,
    last_review TEXT,
    next_review_at TEXT,

    -- Bookkeeping
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_words_status ON words(status);
CREATE INDEX IF NOT EXISTS idx_words_next_review ON words(next_review_at);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: One row per distinct word text
///
/// Existing duplicates keep their lowest id; later copies are removed so the
/// index can be created on databases filled before the constraint existed.
const MIGRATION_V2_UP: &str = r#"
DELETE FROM words
WHERE id NOT IN (SELECT MIN(id) FROM words GROUP BY word);

CREATE UNIQUE INDEX IF NOT EXISTS idx_words_word ON words(word);

UPDATE schema_version SET version = 2, applied_at = datetime('now');
"#;

/// Duplicate rows V2 removes
const MIGRATION_V2_DISCARDS: &str = "SELECT COUNT(*) - COUNT(DISTINCT word) FROM words";

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Number of rows a migration will delete when applied to `conn`
pub fn rows_discarded_by(
    conn: &rusqlite::Connection,
    migration: &Migration,
) -> rusqlite::Result<i64> {
    match migration.discards {
        Some(query) => conn.query_row(query, [], |row| row.get(0)),
        None => Ok(0),
    }
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );

            let discarded = rows_discarded_by(conn, migration)?;
            if discarded > 0 {
                tracing::warn!(
                    version = migration.version,
                    discarded,
                    "Migration removes rows"
                );
            }

            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
