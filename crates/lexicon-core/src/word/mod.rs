//! Word module - Core types
//!
//! - Word records with scheduling state
//! - Client input with validation
//! - Aggregate statistics

mod record;

pub use record::{ValidationError, Word, WordInput, WordStatus};

use serde::{Deserialize, Serialize};

/// Aggregate statistics over the word store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordStats {
    /// Total number of words
    pub total_words: i64,
    /// Words due for review right now
    pub due_for_review: i64,
    pub new: i64,
    pub learning: i64,
    pub review: i64,
    pub mastered: i64,
    /// Sum of correct answers across all words
    pub total_reviews: i64,
}

impl WordStats {
    /// Count for a single status
    pub fn count_for(&self, status: WordStatus) -> i64 {
        match status {
            WordStatus::New => self.new,
            WordStatus::Learning => self.learning,
            WordStatus::Review => self.review,
            WordStatus::Mastered => self.mastered,
        }
    }

    /// Share of words that reached `mastered`, in percent
    pub fn mastery_percent(&self) -> f64 {
        if self.total_words > 0 {
            (self.mastered as f64 / self.total_words as f64) * 100.0
        } else {
            0.0
        }
    }
}
