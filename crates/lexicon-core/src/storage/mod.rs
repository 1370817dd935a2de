//! Storage Module
//!
//! SQLite-based word store with:
//! - Versioned schema migrations
//! - Word CRUD and bulk import
//! - Conditional review writes
//! - Due-for-review selection

mod migrations;
mod sqlite;

use chrono::{DateTime, Utc};

use crate::schedule::ReviewUpdate;
use crate::word::Word;

pub use migrations::MIGRATIONS;
pub use sqlite::{ImportReport, Result, Storage, StorageError};

/// Record store seen by the review scheduler
pub trait WordStore: Send + Sync {
    /// Fetch one word, `None` if it does not exist
    fn get_word(&self, id: i64) -> Result<Option<Word>>;

    /// Write review fields for `current.id`, but only if the stored word still
    /// has the stage, review count and last review of `current`.
    ///
    /// Returns `NotFound` if the word is gone and `Conflict` if it changed.
    fn update_review_fields(&self, current: &Word, update: &ReviewUpdate) -> Result<()>;

    /// Words with `next_review_at <= now` or never scheduled, shuffled, at most `limit`
    fn select_due_for_review(&self, now: DateTime<Utc>, limit: i32) -> Result<Vec<Word>>;
}
