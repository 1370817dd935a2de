//! Interval-table scheduling
//!
//! Pure functions: given a stage, an outcome and `now`, produce the next
//! stage and the next review instant. Nothing here reads or writes state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::word::WordStatus;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Review spacing per memory stage, in days
pub const INTERVAL_DAYS: [i64; 6] = [1, 2, 4, 7, 15, 30];

/// Highest memory stage (index of the longest interval)
pub const MAX_STAGE: i32 = INTERVAL_DAYS.len() as i32 - 1;

/// First stage counted as `review`
const REVIEW_STAGE: i32 = 1;

/// First stage counted as `mastered` (7 day interval)
const MASTERED_STAGE: i32 = 3;

// ============================================================================
// CORE FUNCTIONS
// ============================================================================

/// Clamp any stage value into `[0, MAX_STAGE]`
#[inline]
pub fn clamp_stage(stage: i32) -> i32 {
    stage.clamp(0, MAX_STAGE)
}

/// Interval in days for a stage (out-of-range stages are clamped)
#[inline]
pub fn interval_days(stage: i32) -> i64 {
    INTERVAL_DAYS[clamp_stage(stage) as usize]
}

/// Result of one scheduling step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextReview {
    pub stage: i32,
    pub next_review_at: DateTime<Utc>,
}

/// Advance or regress one stage and schedule the next review from `now`.
///
/// A correct answer moves up one stage (capped at `MAX_STAGE`), a miss moves
/// down one (floored at 0). The stored previous due date plays no part: a
/// long-overdue word answered wrong is still due `now + interval`.
pub fn compute_next_review(current_stage: i32, was_correct: bool, now: DateTime<Utc>) -> NextReview {
    let stage = clamp_stage(current_stage);
    let next = if was_correct {
        (stage + 1).min(MAX_STAGE)
    } else {
        (stage - 1).max(0)
    };

    NextReview {
        stage: next,
        next_review_at: now + Duration::days(interval_days(next)),
    }
}

/// Status for a stage reached through review
pub fn derive_status(stage: i32) -> WordStatus {
    let stage = clamp_stage(stage);
    if stage >= MASTERED_STAGE {
        WordStatus::Mastered
    } else if stage >= REVIEW_STAGE {
        WordStatus::Review
    } else {
        WordStatus::Learning
    }
}

/// Status of a word: `New` until it has been reviewed once, stage-derived after.
///
/// A reviewed word back at stage 0 is `Learning`, never `New`.
pub fn status_for(stage: i32, ever_reviewed: bool) -> WordStatus {
    if ever_reviewed {
        derive_status(stage)
    } else {
        WordStatus::New
    }
}

/// First due date of a freshly created word (one stage-0 interval out)
pub fn initial_review_at(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(interval_days(0))
}
