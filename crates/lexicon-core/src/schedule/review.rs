//! Review orchestration
//!
//! Applies one answer to a stored word: read, schedule, persist. The store
//! write is conditional on the word being unchanged since the read, so two
//! concurrent answers for the same word cannot silently overwrite each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::algorithm::{compute_next_review, derive_status};
use crate::clock::Clock;
use crate::storage::{Result, StorageError, WordStore};
use crate::word::{Word, WordStatus};

/// Attempts before a contended review gives up with `Conflict`
pub const MAX_REVIEW_ATTEMPTS: u32 = 3;

/// Review fields written back to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
    pub last_review: DateTime<Utc>,
    pub next_review_at: DateTime<Utc>,
    pub memory_stage: i32,
    pub review_count: i32,
    pub status: WordStatus,
}

/// What a caller learns after submitting an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub id: i64,
    pub next_review_at: DateTime<Utc>,
    pub memory_stage: i32,
    pub review_count: i32,
    pub status: WordStatus,
    pub last_review: DateTime<Utc>,
}

impl ReviewOutcome {
    fn new(id: i64, update: &ReviewUpdate) -> Self {
        Self {
            id,
            next_review_at: update.next_review_at,
            memory_stage: update.memory_stage,
            review_count: update.review_count,
            status: update.status,
            last_review: update.last_review,
        }
    }
}

/// Compute the review fields for one answer without touching storage
pub fn plan_review(word: &Word, was_correct: bool, now: DateTime<Utc>) -> ReviewUpdate {
    let next = compute_next_review(word.memory_stage, was_correct, now);
    let review_count = if was_correct {
        word.review_count.saturating_add(1)
    } else {
        word.review_count
    };

    ReviewUpdate {
        last_review: now,
        next_review_at: next.next_review_at,
        memory_stage: next.stage,
        review_count,
        status: derive_status(next.stage),
    }
}

/// Record an answer for word `id` and persist the new schedule.
///
/// Fails with `NotFound` if the word does not exist, `Conflict` if it kept
/// changing underneath us for `MAX_REVIEW_ATTEMPTS` reads.
pub fn record_review<S>(store: &S, id: i64, was_correct: bool, clock: &dyn Clock) -> Result<ReviewOutcome>
where
    S: WordStore + ?Sized,
{
    for attempt in 1..=MAX_REVIEW_ATTEMPTS {
        let word = store.get_word(id)?.ok_or(StorageError::NotFound(id))?;
        let update = plan_review(&word, was_correct, clock.now());

        match store.update_review_fields(&word, &update) {
            Ok(()) => {
                tracing::info!(
                    word_id = id,
                    correct = was_correct,
                    stage = update.memory_stage,
                    status = %update.status,
                    next_review = %update.next_review_at,
                    "Review recorded"
                );
                return Ok(ReviewOutcome::new(id, &update));
            }
            Err(StorageError::Conflict(_)) => {
                tracing::debug!(word_id = id, attempt, "Word changed during review, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    tracing::warn!(word_id = id, "Review abandoned after repeated conflicts");
    Err(StorageError::Conflict(id))
}
