//! Spaced repetition algorithm implementations.

pub mod ease;

use crate::types::{Card, Grade};
use chrono::{DateTime, Utc};

/// Trait for spaced repetition algorithms.
pub trait SchedulingAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Calculate the card state after a review.
    ///
    /// `prior` is `None` for a card that has never been reviewed.
    fn schedule(&self, prior: Option<&Card>, grade: Grade, now: DateTime<Utc>) -> Card;
}
