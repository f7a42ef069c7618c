//! Shared spaced-repetition types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Grade given to a card on review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }

    /// Map a 2-point result to a grade.
    /// Wrong -> Again, Correct -> Good
    pub fn from_2point(correct: bool) -> Self {
        if correct {
            Self::Good
        } else {
            Self::Again
        }
    }
}

/// Scheduling state of one reviewable card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub ease: f64,
    pub interval_days: u32,
    pub next_review_at: DateTime<Utc>,
    pub total_reviews: u32,
    pub last_result: Grade,
}

impl Card {
    /// Whether the card is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }
}

/// Persisted card states keyed by caller-supplied card key.
pub type CardMap = BTreeMap<String, Card>;

/// Flashcard with an independent key, parsed from a deck file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub key: String,
    pub front: String,
    pub back: String,
    pub line_number: usize,
}

/// Matching mode for typed flashcard answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingMode {
    Exact,
    CaseInsensitive,
    #[default]
    Fuzzy,
}
