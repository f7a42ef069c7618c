//! Spaced repetition scheduler over a card store.
//!
//! Every review reads the whole card map, updates one entry and writes the
//! whole map back. Store failures are logged and swallowed so a review
//! never disrupts the caller.

use crate::algorithm::ease::EaseSchedule;
use crate::algorithm::SchedulingAlgorithm;
use crate::matching::{compare_with_settings, MatchResult};
use crate::settings::{MatchingSettings, SchedulerSettings, StudyLimits};
use crate::store::CardStore;
use crate::types::{Card, CardMap, Grade};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Keys to study in one sitting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyQueue {
    pub new_keys: Vec<String>,
    pub review_keys: Vec<String>,
    pub new_remaining: usize,
    pub review_remaining: usize,
}

/// Card counts over a set of keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckStats {
    pub total: usize,
    /// Never reviewed.
    pub new: usize,
    /// Reviewed and due now.
    pub due: usize,
    /// Reviewed, interval below the mature threshold.
    pub learning: usize,
    /// Reviewed, interval at or above the mature threshold.
    pub mature: usize,
    pub average_ease: f64,
    pub average_interval: f64,
}

/// Scheduler owning a card store and a scheduling algorithm.
pub struct Scheduler<S: CardStore> {
    store: S,
    algorithm: Box<dyn SchedulingAlgorithm>,
    mature_interval_days: u32,
}

impl<S: CardStore> Scheduler<S> {
    /// Create a scheduler using the default ease-adjusted schedule.
    pub fn new(store: S) -> Self {
        Self::with_settings(store, SchedulerSettings::default())
    }

    pub fn with_settings(store: S, settings: SchedulerSettings) -> Self {
        let mature_interval_days = settings.mature_interval_days;
        Self {
            store,
            algorithm: Box::new(EaseSchedule::new(settings)),
            mature_interval_days,
        }
    }

    /// Use a different scheduling algorithm.
    pub fn with_algorithm(mut self, algorithm: Box<dyn SchedulingAlgorithm>) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Review a card now.
    pub fn review(&mut self, key: &str, grade: Grade) -> Card {
        self.review_at(key, grade, Utc::now())
    }

    /// Review a card at an explicit time.
    pub fn review_at(&mut self, key: &str, grade: Grade, now: DateTime<Utc>) -> Card {
        let (mut cards, loaded) = match self.store.load() {
            Ok(cards) => (cards, true),
            Err(e) => {
                tracing::warn!("Failed to load card store, review of {} will not persist: {}", key, e);
                (CardMap::new(), false)
            }
        };

        let card = self.algorithm.schedule(cards.get(key), grade, now);
        tracing::debug!(
            key,
            grade = ?grade,
            interval_days = card.interval_days,
            ease = card.ease,
            algorithm = self.algorithm.name(),
            "Card reviewed"
        );
        cards.insert(key.to_string(), card.clone());

        // Writing after a failed load would clobber the stored map.
        if loaded {
            if let Err(e) = self.store.save(&cards) {
                tracing::warn!("Failed to persist card store after reviewing {}: {}", key, e);
            }
        }

        card
    }

    /// Grade a typed answer against the card's back and review it now.
    pub fn review_typed(
        &mut self,
        key: &str,
        typed: &str,
        expected: &str,
        matching: &MatchingSettings,
    ) -> (MatchResult, Card) {
        self.review_typed_at(key, typed, expected, matching, Utc::now())
    }

    /// Grade a typed answer and review the card with the suggested grade.
    pub fn review_typed_at(
        &mut self,
        key: &str,
        typed: &str,
        expected: &str,
        matching: &MatchingSettings,
        now: DateTime<Utc>,
    ) -> (MatchResult, Card) {
        let result = compare_with_settings(typed, expected, matching);
        tracing::debug!(
            key,
            similarity = result.similarity,
            correct = result.is_correct,
            "Typed answer compared"
        );
        let card = self.review_at(key, result.suggested_grade(), now);
        (result, card)
    }

    /// Current state of a card, if it has ever been reviewed.
    pub fn card(&self, key: &str) -> Option<Card> {
        self.load_or_empty().remove(key)
    }

    /// Keys that are due now.
    pub fn due_cards<'a, I>(&self, keys: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.due_cards_at(keys, Utc::now())
    }

    /// Keys that were never reviewed or whose next review is at or before `now`.
    pub fn due_cards_at<'a, I>(&self, keys: I, now: DateTime<Utc>) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let cards = self.load_or_empty();
        keys.into_iter()
            .filter(|key| cards.get(*key).map_or(true, |card| card.is_due(now)))
            .map(str::to_string)
            .collect()
    }

    pub fn study_queue<'a, I>(&self, keys: I, limits: &StudyLimits) -> StudyQueue
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.study_queue_at(keys, limits, Utc::now())
    }

    /// Split due keys into new and review queues, capped by `limits`.
    ///
    /// New keys keep their input order; review keys are ordered most
    /// overdue first.
    pub fn study_queue_at<'a, I>(
        &self,
        keys: I,
        limits: &StudyLimits,
        now: DateTime<Utc>,
    ) -> StudyQueue
    where
        I: IntoIterator<Item = &'a str>,
    {
        let cards = self.load_or_empty();
        let mut new_keys = Vec::new();
        let mut reviews: Vec<(&str, DateTime<Utc>)> = Vec::new();

        for key in keys {
            match cards.get(key) {
                None => new_keys.push(key.to_string()),
                Some(card) if card.is_due(now) => reviews.push((key, card.next_review_at)),
                Some(_) => {}
            }
        }
        reviews.sort_by_key(|(_, due)| *due);

        new_keys.truncate(limits.new_per_session);
        let review_keys: Vec<String> = reviews
            .into_iter()
            .take(limits.reviews_per_session)
            .map(|(key, _)| key.to_string())
            .collect();

        StudyQueue {
            new_remaining: limits.new_per_session.saturating_sub(new_keys.len()),
            review_remaining: limits.reviews_per_session.saturating_sub(review_keys.len()),
            new_keys,
            review_keys,
        }
    }

    pub fn stats<'a, I>(&self, keys: I) -> DeckStats
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.stats_at(keys, Utc::now())
    }

    pub fn stats_at<'a, I>(&self, keys: I, now: DateTime<Utc>) -> DeckStats
    where
        I: IntoIterator<Item = &'a str>,
    {
        let cards = self.load_or_empty();
        let mut stats = DeckStats::default();
        let mut ease_sum = 0.0;
        let mut interval_sum = 0.0;

        for key in keys {
            stats.total += 1;
            let Some(card) = cards.get(key) else {
                stats.new += 1;
                continue;
            };
            if card.is_due(now) {
                stats.due += 1;
            }
            if card.interval_days >= self.mature_interval_days {
                stats.mature += 1;
            } else {
                stats.learning += 1;
            }
            ease_sum += card.ease;
            interval_sum += f64::from(card.interval_days);
        }

        let reviewed = stats.learning + stats.mature;
        if reviewed > 0 {
            stats.average_ease = ease_sum / reviewed as f64;
            stats.average_interval = interval_sum / reviewed as f64;
        }
        stats
    }

    fn load_or_empty(&self) -> CardMap {
        self.store.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load card store, treating every card as new: {}", e);
            CardMap::new()
        })
    }
}
