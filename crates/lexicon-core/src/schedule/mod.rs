//! Review Scheduler
//!
//! Fixed interval-table spaced repetition.
//!
//! | stage | interval | status after review |
//! |-------|----------|---------------------|
//! | 0     | 1 day    | learning            |
//! | 1     | 2 days   | review              |
//! | 2     | 4 days   | review              |
//! | 3     | 7 days   | mastered            |
//! | 4     | 15 days  | mastered            |
//! | 5     | 30 days  | mastered            |
//!
//! A correct answer moves one row down, a miss one row up. Words that were
//! never reviewed stay `new` regardless of stage.

mod algorithm;
mod review;

pub use algorithm::{
    clamp_stage, compute_next_review, derive_status, initial_review_at, interval_days,
    status_for, NextReview, INTERVAL_DAYS, MAX_STAGE,
};

pub use review::{plan_review, record_review, ReviewOutcome, ReviewUpdate, MAX_REVIEW_ATTEMPTS};
