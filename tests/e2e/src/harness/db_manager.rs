//! Test Database Manager
//!
//! Provides isolated database instances for testing:
//! - Temporary databases that are automatically cleaned up
//! - Pre-seeded databases with vocabulary
//! - Snapshots through the export/import path

use std::path::PathBuf;
use std::sync::Arc;

use lexicon_core::{Clock, Storage, Word, WordInput};
use tempfile::TempDir;

use crate::mocks::{ManualClock, TestDataFactory};

/// Manager for test databases
///
/// Creates isolated database instances for each test to prevent interference.
/// Automatically cleans up temporary databases when dropped.
///
/// # Example
///
/// ```rust,ignore
/// let db = TestDatabaseManager::new_temp();
/// db.seed_words(10);
/// db.clock.advance_days(1);
/// ```
pub struct TestDatabaseManager {
    /// The storage instance
    pub storage: Arc<Storage>,
    /// Clock shared by everything the test drives
    pub clock: Arc<ManualClock>,
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: Option<TempDir>,
    /// Path to the database file
    db_path: PathBuf,
    /// Snapshot data for restore operations
    snapshot: Option<Vec<WordInput>>,
}

impl TestDatabaseManager {
    /// Create a new test database in a temporary directory
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_lexicon.db");

        let storage = Storage::new(Some(db_path.clone())).expect("Failed to create test storage");

        Self {
            storage: Arc::new(storage),
            clock: Arc::new(ManualClock::default()),
            _temp_dir: Some(temp_dir),
            db_path,
            snapshot: None,
        }
    }

    /// Directory holding the database, for backups and exports
    pub fn dir(&self) -> PathBuf {
        self.db_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default()
    }

    /// Get the database path
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Number of stored words
    pub fn word_count(&self) -> usize {
        self.storage.list_words().map(|w| w.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.word_count() == 0
    }

    // ========================================================================
    // SEEDING METHODS
    // ========================================================================

    /// Seed the database with `count` sample words at the current clock time
    pub fn seed_words(&self, count: usize) -> Vec<Word> {
        TestDataFactory::create_vocabulary(&self.storage, self.clock.as_ref(), count)
    }

    // ========================================================================
    // SNAPSHOT/RESTORE
    // ========================================================================

    /// Remember the current word contents
    pub fn take_snapshot(&mut self) {
        let inputs = self
            .storage
            .list_words()
            .unwrap_or_default()
            .into_iter()
            .map(WordInput::from)
            .collect();
        self.snapshot = Some(inputs);
    }

    /// Re-import the last snapshot. Scheduling state starts over.
    pub fn restore_snapshot(&mut self) -> bool {
        match self.snapshot.take() {
            Some(inputs) => self
                .storage
                .import_words(&inputs, self.clock.now())
                .is_ok(),
            None => false,
        }
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    // ========================================================================
    // CLEANUP
    // ========================================================================

    pub fn clear(&self) {
        let _ = self.storage.delete_all_words();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_database_creation() {
        let db = TestDatabaseManager::new_temp();
        assert!(db.is_empty());
        assert!(db.path().exists());
    }

    #[test]
    fn test_seed_words() {
        let db = TestDatabaseManager::new_temp();
        let words = db.seed_words(12);

        assert_eq!(words.len(), 12);
        assert_eq!(db.word_count(), 12);
    }

    #[test]
    fn test_clear_database() {
        let db = TestDatabaseManager::new_temp();
        db.seed_words(5);
        db.clear();
        assert!(db.is_empty());
    }

    #[test]
    fn test_snapshot_restore() {
        let mut db = TestDatabaseManager::new_temp();
        db.seed_words(5);

        db.take_snapshot();
        assert!(db.has_snapshot());

        db.clear();
        assert!(db.is_empty());

        assert!(db.restore_snapshot());
        assert_eq!(db.word_count(), 5);
    }
}
