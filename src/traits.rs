use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type Id = u64;

/// Identifier of a term in the catalog.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize,
)]
pub struct TermId(pub Id);

/// Identifier of a chapter grouping terms.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize,
)]
pub struct ChapterId(pub Id);

/// Errors surfaced by the trainer core, nothing in here is retried.
#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
    /// A rating outside of 0..=5 is a contract violation, never clamped.
    #[error("rating {0} is outside the supported range of 0 to 5")]
    InvalidRating(u8),

    /// A session or quiz was requested over an empty term pool.
    #[error("the term pool is empty")]
    EmptyPool,

    /// A due-only session found nothing to review. Distinct from an empty
    /// pool so the caller can decide to fall back to a full review.
    #[error("no terms are due for review")]
    NothingDue,

    /// Rate or exit was called without an active session.
    #[error("no session is active")]
    SessionNotActive,

    /// Start was called while a session is running.
    #[error("a session is already active")]
    SessionActive,

    #[error("unsupported file type for {0}, use .yaml")]
    UnsupportedFile(String),

    #[error("term {term:?} refers to unknown chapter {chapter:?}")]
    UnknownChapter { term: TermId, chapter: ChapterId },

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml failure: {0}")]
    Format(#[from] serde_yaml::Error),
}

/// Learner rating after recalling a term, 0 is a blank, 5 a perfect recall.
/// Good (3) is the pass/fail threshold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rating {
    Again,
    Wrong,
    Hard,
    Good,
    Easy,
    Perfect,
}

impl Rating {
    /// Parse a raw quality value, rejecting anything outside 0..=5.
    pub fn from_value(value: u8) -> Result<Rating, TrainerError> {
        match value {
            0 => Ok(Rating::Again),
            1 => Ok(Rating::Wrong),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            5 => Ok(Rating::Perfect),
            v => Err(TrainerError::InvalidRating(v)),
        }
    }

    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Whether this rating counts as a successful recall.
    pub fn is_success(&self) -> bool {
        *self >= Rating::Good
    }
}

/// A catalog entry. Owned by the catalog, read-only to the core.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Term {
    pub id: TermId,
    pub chapter: ChapterId,
    /// Canonical display string, the grading target for quizzes.
    pub term: String,
    /// Prompt text shown to the learner.
    pub definition: String,
    /// Optional pre-written elaboration on the definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Per-term spaced repetition state, created on the first rating of a term.
/// Absence of a record means the term was never studied and is always due.
#[derive(Debug, PartialEq, Copy, Clone, Deserialize, Serialize)]
pub struct ProgressRecord {
    pub term: TermId,
    /// Days until the next review.
    pub interval: u32,
    /// Consecutive successful recalls.
    pub repetition: u32,
    /// Growth multiplier for the interval, never below 1.3.
    pub ease_factor: f64,
    pub next_review: std::time::SystemTime,
}

pub type ProgressMap = HashMap<TermId, ProgressRecord>;

/// Something to persist per-term progress between sessions.
pub trait ProgressStore: std::fmt::Debug {
    /// Retrieve all known progress records, empty if nothing was stored yet.
    fn load(&self) -> Result<ProgressMap, TrainerError>;

    /// Store all progress records, last write wins per term.
    fn save(&mut self, progress: &ProgressMap) -> Result<(), TrainerError>;
}

/// Something to accumulate total study time across sessions.
pub trait StudyTimeSink: std::fmt::Debug {
    /// Add the elapsed seconds of one finished or abandoned session.
    fn add_elapsed(&mut self, seconds: u64) -> Result<(), TrainerError>;
}
