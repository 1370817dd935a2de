//! Word record - The fundamental unit of the vocabulary
//!
//! Each record carries:
//! - The word, its definition and an optional example sentence
//! - Review scheduling state (memory stage, next review)
//! - Review bookkeeping (count, last review, timestamps)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// STATUS
// ============================================================================

/// Mastery status of a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    /// Created, never reviewed
    #[default]
    New,
    /// Stage 0 after at least one review (1 day interval)
    Learning,
    /// Stages 1-2 (2-4 day intervals)
    Review,
    /// Stages 3-5 (7 days and beyond)
    Mastered,
}

impl WordStatus {
    /// All statuses, in progression order
    pub const ALL: [WordStatus; 4] = [
        WordStatus::New,
        WordStatus::Learning,
        WordStatus::Review,
        WordStatus::Mastered,
    ];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            WordStatus::New => "new",
            WordStatus::Learning => "learning",
            WordStatus::Review => "review",
            WordStatus::Mastered => "mastered",
        }
    }

    /// Parse from stored name, unknown values fall back to `New`
    pub fn parse_name(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl std::fmt::Display for WordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(WordStatus::New),
            "learning" => Ok(WordStatus::Learning),
            "review" => Ok(WordStatus::Review),
            "mastered" => Ok(WordStatus::Mastered),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

// ============================================================================
// WORD
// ============================================================================

/// A stored vocabulary word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    /// Row id, assigned on creation
    pub id: i64,
    pub word: String,
    pub definition: String,
    pub example: Option<String>,
    /// Derived from the memory stage, `New` until first review
    pub status: WordStatus,
    /// Index into the interval table, always in `[0, MAX_STAGE]`
    pub memory_stage: i32,
    /// Correct answers so far
    pub review_count: i32,
    /// Most recent review attempt, correct or not
    pub last_review: Option<DateTime<Utc>>,
    /// When the word becomes due again (`None` = due now)
    pub next_review_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Word {
    /// Whether the word has ever been reviewed
    pub fn is_reviewed(&self) -> bool {
        self.last_review.is_some()
    }

    /// Whether the word should be offered for review at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_review_at {
            Some(at) => at <= now,
            None => true,
        }
    }
}

// ============================================================================
// INPUT
// ============================================================================

/// Why a word input was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("word must not be empty")]
    EmptyWord,
    #[error("definition must not be empty")]
    EmptyDefinition,
    #[error("example must not be blank")]
    BlankExample,
}

/// Client-supplied word content (create, update, import)
///
/// Unknown fields are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WordInput {
    pub word: String,
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
}

impl WordInput {
    pub fn new(word: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            definition: definition.into(),
            example: None,
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Parse an import file: a JSON array of inputs, or of exported words.
    ///
    /// Exported scheduling fields are dropped. When neither shape matches,
    /// the error is the one for the input shape.
    pub fn parse_batch(json: &str) -> serde_json::Result<Vec<WordInput>> {
        match serde_json::from_str::<Vec<WordInput>>(json) {
            Ok(inputs) => Ok(inputs),
            Err(err) => serde_json::from_str::<Vec<Word>>(json)
                .map(|words| words.into_iter().map(WordInput::from).collect())
                .map_err(|_| err),
        }
    }

    /// Validate and return the trimmed form that gets stored.
    ///
    /// An empty `example` is treated as absent; a whitespace-only one is
    /// rejected.
    pub fn normalized(&self) -> Result<WordInput, ValidationError> {
        let word = self.word.trim();
        if word.is_empty() {
            return Err(ValidationError::EmptyWord);
        }
        let definition = self.definition.trim();
        if definition.is_empty() {
            return Err(ValidationError::EmptyDefinition);
        }
        let example = match self.example.as_deref() {
            None | Some("") => None,
            Some(e) if e.trim().is_empty() => return Err(ValidationError::BlankExample),
            Some(e) => Some(e.trim().to_string()),
        };

        Ok(WordInput {
            word: word.to_string(),
            definition: definition.to_string(),
            example,
        })
    }
}

impl From<Word> for WordInput {
    fn from(word: Word) -> Self {
        Self {
            word: word.word,
            definition: word.definition,
            example: word.example,
        }
    }
}
