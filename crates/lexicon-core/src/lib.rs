//! # Lexicon Core
//!
//! Vocabulary flashcard engine. Words live in a local SQLite table and are
//! scheduled for review with a fixed interval table:
//!
//! - **Interval table**: 1, 2, 4, 7, 15 and 30 days, indexed by memory stage
//! - **Stage transitions**: a correct answer advances one stage, a miss
//!   falls back one stage, both saturate at the table ends
//! - **Status**: `new` until the first review, then derived from the stage
//! - **Due selection**: overdue or never-scheduled words, shuffled, capped
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lexicon_core::{record_review, Storage, SystemClock, WordInput};
//!
//! let storage = Storage::new(None)?;
//! let word = storage.create_word(
//!     WordInput::new("ephemeral", "lasting a very short time"),
//!     chrono::Utc::now(),
//! )?;
//!
//! let outcome = record_review(&storage, word.id, true, &SystemClock)?;
//! assert_eq!(outcome.memory_stage, 1);
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod clock;
pub mod schedule;
pub mod storage;
pub mod word;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use clock::{Clock, FixedClock, SystemClock};

pub use schedule::{
    compute_next_review, derive_status, initial_review_at, interval_days, plan_review,
    record_review, status_for, NextReview, ReviewOutcome, ReviewUpdate, INTERVAL_DAYS,
    MAX_REVIEW_ATTEMPTS, MAX_STAGE,
};

pub use storage::{ImportReport, Result, Storage, StorageError, WordStore};

pub use word::{ValidationError, Word, WordInput, WordStats, WordStatus};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of words handed out per review session
pub const DEFAULT_REVIEW_BATCH: i32 = 20;

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        record_review, Clock, ReviewOutcome, Storage, StorageError, SystemClock, Word,
        WordInput, WordStatus, WordStore,
    };
}
