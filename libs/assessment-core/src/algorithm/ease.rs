//! Ease-adjusted interval schedule.
//!
//! A Leitner/SM-2 hybrid: each grade nudges the ease factor, and the next
//! interval steps 0 → 1 → round(6 × ease) → round(prior × ease) days.

use super::SchedulingAlgorithm;
use crate::settings::SchedulerSettings;
use crate::types::{Card, Grade};
use chrono::{DateTime, Duration, Utc};

/// Ease-adjusted schedule with configurable parameters.
#[derive(Debug, Clone, Default)]
pub struct EaseSchedule {
    pub settings: SchedulerSettings,
}

impl EaseSchedule {
    pub fn new(settings: SchedulerSettings) -> Self {
        Self { settings }
    }

    fn adjust_ease(&self, ease: f64, grade: Grade) -> f64 {
        let s = &self.settings;
        match grade {
            Grade::Again => (ease - s.again_penalty).max(s.minimum_ease),
            Grade::Hard => (ease - s.hard_penalty).max(s.minimum_ease),
            Grade::Good => ease,
            Grade::Easy => ease + s.easy_bonus,
        }
    }

    fn next_interval(&self, prior_interval: u32, ease: f64, grade: Grade) -> u32 {
        let again = grade == Grade::Again;
        match prior_interval {
            0 => u32::from(!again),
            1 if again => 0,
            1 => round_days(self.settings.second_interval_multiplier * ease),
            // Lapse on a graduated card
            _ if again => 1,
            prior => round_days(f64::from(prior) * ease).max(1),
        }
    }
}

fn round_days(days: f64) -> u32 {
    if days.is_finite() && days > 0.0 {
        days.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

impl SchedulingAlgorithm for EaseSchedule {
    fn name(&self) -> &'static str {
        "ease"
    }

    fn schedule(&self, prior: Option<&Card>, grade: Grade, now: DateTime<Utc>) -> Card {
        let (prior_ease, prior_interval, prior_reviews) = match prior {
            Some(card) => (card.ease, card.interval_days, card.total_reviews),
            None => (self.settings.initial_ease, 0, 0),
        };

        let ease = self.adjust_ease(prior_ease, grade);
        let interval_days = self.next_interval(prior_interval, ease, grade);

        Card {
            ease,
            interval_days,
            next_review_at: now
                .checked_add_signed(Duration::days(i64::from(interval_days)))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            total_reviews: prior_reviews.saturating_add(1),
            last_result: grade,
        }
    }
}
