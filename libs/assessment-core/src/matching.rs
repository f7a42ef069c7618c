//! Typed-answer matching for flashcard reviews.

use crate::settings::MatchingSettings;
use crate::types::{Grade, MatchingMode};
use serde::{Deserialize, Serialize};

/// Result of comparing a typed answer to a card's back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether the answer is considered correct.
    pub is_correct: bool,
    /// Similarity score between 0.0 and 1.0.
    pub similarity: f64,
    /// The matching mode used.
    pub matching_mode: MatchingMode,
    /// Normalized typed answer (for display).
    pub typed_normalized: String,
    /// Normalized expected answer (for display).
    pub expected_normalized: String,
}

impl MatchResult {
    /// Grade to feed the scheduler for this typed answer.
    pub fn suggested_grade(&self) -> Grade {
        Grade::from_2point(self.is_correct)
    }
}

/// Compare a typed answer to the expected answer.
pub fn compare_answers(
    typed: &str,
    expected: &str,
    mode: MatchingMode,
    fuzzy_threshold: f64,
) -> MatchResult {
    let typed_normalized = normalize_whitespace(typed);
    let expected_normalized = normalize_whitespace(expected);

    let similarity = match mode {
        MatchingMode::Exact => exact_score(typed_normalized == expected_normalized),
        MatchingMode::CaseInsensitive => exact_score(
            typed_normalized.to_lowercase() == expected_normalized.to_lowercase(),
        ),
        MatchingMode::Fuzzy => normalized_similarity(
            &typed_normalized.to_lowercase(),
            &expected_normalized.to_lowercase(),
        ),
    };
    let is_correct = match mode {
        MatchingMode::Fuzzy => similarity >= fuzzy_threshold,
        _ => similarity == 1.0,
    };

    MatchResult {
        is_correct,
        similarity,
        matching_mode: mode,
        typed_normalized,
        expected_normalized,
    }
}

/// Compare using the configured matching mode and threshold.
pub fn compare_with_settings(
    typed: &str,
    expected: &str,
    settings: &MatchingSettings,
) -> MatchResult {
    compare_answers(typed, expected, settings.mode, settings.fuzzy_threshold)
}

fn exact_score(equal: bool) -> f64 {
    if equal {
        1.0
    } else {
        0.0
    }
}

/// Trim and collapse runs of whitespace.
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Levenshtein distance between two strings, counted in chars.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Two rows instead of the full matrix
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Similarity in `[0, 1]` derived from Levenshtein distance.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (levenshtein_distance(a, b) as f64 / max_len as f64)
}
