//! Session analytics and remediation recommendations.

use crate::question::Question;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// One graded attempt. Immutable once appended to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub question_id: String,
    pub correct: bool,
    pub tags: BTreeSet<String>,
    pub outcome_id: String,
}

impl AttemptRecord {
    pub fn new(question: &Question, correct: bool) -> Self {
        Self {
            question_id: question.id.clone(),
            correct,
            tags: question.tags.clone(),
            outcome_id: question.outcome_id.clone(),
        }
    }

    /// Record for a sub-question of a `case`. A sub-question without its
    /// own outcome counts toward the parent's.
    pub fn within_case(question: &Question, parent: &Question, correct: bool) -> Self {
        let mut record = Self::new(question, correct);
        if record.outcome_id.is_empty() {
            record.outcome_id = parent.outcome_id.clone();
        }
        record
    }
}

/// Correct and total attempt counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: usize,
    pub total: usize,
}

impl Tally {
    pub fn new(correct: usize, total: usize) -> Self {
        Self { correct, total }
    }

    fn add(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// Fraction correct in `[0, 1]`; zero when nothing was attempted.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Tallies keyed by name, iterated in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(String, Tally)>", into = "Vec<(String, Tally)>")]
pub struct TallyTable {
    entries: Vec<(String, Tally)>,
    index: HashMap<String, usize>,
}

impl TallyTable {
    fn record(&mut self, key: &str, correct: bool) {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.entries.push((key.to_string(), Tally::default()));
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[slot].1.add(correct);
    }

    pub fn get(&self, key: &str) -> Option<Tally> {
        self.index.get(key).map(|&slot| self.entries[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Tally)> {
        self.entries.iter().map(|(key, tally)| (key.as_str(), *tally))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<(String, Tally)>> for TallyTable {
    fn from(entries: Vec<(String, Tally)>) -> Self {
        let mut table = Self::default();
        for (key, tally) in entries {
            match table.index.get(&key) {
                Some(&slot) => {
                    table.entries[slot].1.correct += tally.correct;
                    table.entries[slot].1.total += tally.total;
                }
                None => {
                    table.index.insert(key.clone(), table.entries.len());
                    table.entries.push((key, tally));
                }
            }
        }
        table
    }
}

impl From<TallyTable> for Vec<(String, Tally)> {
    fn from(table: TallyTable) -> Self {
        table.entries
    }
}

/// Aggregated accuracy of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub overall: Tally,
    pub by_tag: TallyTable,
    pub by_outcome: TallyTable,
}

/// Fold attempt records into overall, per-tag and per-outcome tallies.
///
/// Every record counts once per occurrence, so a requeued question
/// contributes one record per attempt. Records without an outcome id only
/// count toward the overall and per-tag tallies.
pub fn aggregate(records: &[AttemptRecord]) -> Analytics {
    records.iter().fold(Analytics::default(), |mut acc, record| {
        acc.overall.add(record.correct);
        for tag in &record.tags {
            acc.by_tag.record(tag, record.correct);
        }
        if !record.outcome_id.is_empty() {
            acc.by_outcome.record(&record.outcome_id, record.correct);
        }
        acc
    })
}

/// Reference material pointer for each learning outcome.
///
/// The pointer is the `reference` of the first question, in bank order
/// with sub-questions visited after their parent, that carries it. A
/// sub-question without an outcome id contributes to its parent's outcome.
#[derive(Debug, Clone, Default)]
pub struct OutcomeReferences {
    references: HashMap<String, String>,
}

impl OutcomeReferences {
    pub fn from_questions(questions: &[Question]) -> Self {
        let mut references = HashMap::new();
        fn visit(
            questions: &[Question],
            inherited: &str,
            references: &mut HashMap<String, String>,
        ) {
            for question in questions {
                let outcome_id = if question.outcome_id.is_empty() {
                    inherited
                } else {
                    question.outcome_id.as_str()
                };
                let reference = question.reference.as_ref().filter(|_| !outcome_id.is_empty());
                if let Some(reference) = reference {
                    references
                        .entry(outcome_id.to_string())
                        .or_insert_with(|| reference.clone());
                }
                visit(question.sub_questions(), outcome_id, references);
            }
        }
        visit(questions, "", &mut references);
        Self { references }
    }

    pub fn get(&self, outcome_id: &str) -> Option<&str> {
        self.references.get(outcome_id).map(String::as_str)
    }
}

/// Guidance derived from a session's analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    /// An outcome below the remediation threshold.
    Remediate {
        outcome_id: String,
        accuracy: f64,
        reference: Option<String>,
    },
    /// Every outcome met the threshold.
    Reinforce,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remediate {
                outcome_id,
                accuracy,
                reference,
            } => {
                write!(
                    f,
                    "Review outcome {} (accuracy {:.0}%). See {}.",
                    outcome_id,
                    accuracy * 100.0,
                    reference.as_deref().unwrap_or("the course material for this outcome")
                )
            }
            Self::Reinforce => write!(
                f,
                "Great work: every outcome is on track. Try an adaptive re-run to lock it in."
            ),
        }
    }
}

/// Derive recommendations from per-outcome accuracy.
///
/// Outcomes below `threshold` are listed in order of first appearance. With
/// none below it and at least one record, a single `Reinforce` is returned.
pub fn recommend(
    analytics: &Analytics,
    references: &OutcomeReferences,
    threshold: f64,
) -> Vec<Recommendation> {
    let remediations: Vec<Recommendation> = analytics
        .by_outcome
        .iter()
        .filter(|(outcome_id, tally)| !outcome_id.is_empty() && tally.accuracy() < threshold)
        .map(|(outcome_id, tally)| Recommendation::Remediate {
            outcome_id: outcome_id.to_string(),
            accuracy: tally.accuracy(),
            reference: references.get(outcome_id).map(str::to_string),
        })
        .collect();

    if remediations.is_empty() && analytics.overall.total > 0 {
        vec![Recommendation::Reinforce]
    } else {
        remediations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(tags: &[&str], outcome: &str, correct: bool) -> AttemptRecord {
        AttemptRecord {
            question_id: "q".to_string(),
            correct,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            outcome_id: outcome.to_string(),
        }
    }

    #[test]
    fn aggregates_by_tag_and_overall() {
        let records = vec![
            record(&["t1"], "o1", true),
            record(&["t1"], "o1", false),
            record(&["t2"], "o2", true),
        ];
        let analytics = aggregate(&records);
        assert_eq!(analytics.overall, Tally::new(2, 3));
        assert_eq!(analytics.by_tag.get("t1"), Some(Tally::new(1, 2)));
        assert_eq!(analytics.by_tag.get("t2"), Some(Tally::new(1, 1)));
        assert_eq!(analytics.by_outcome.get("o1"), Some(Tally::new(1, 2)));
    }

    #[test]
    fn record_counts_toward_every_tag() {
        let analytics = aggregate(&[record(&["a", "b"], "o", true)]);
        assert_eq!(analytics.by_tag.len(), 2);
        assert_eq!(analytics.by_tag.get("a"), Some(Tally::new(1, 1)));
        assert_eq!(analytics.by_tag.get("b"), Some(Tally::new(1, 1)));
    }

    #[test]
    fn outcomes_keep_first_appearance_order() {
        let analytics = aggregate(&[
            record(&[], "z", false),
            record(&[], "a", false),
            record(&[], "z", true),
        ]);
        let order: Vec<&str> = analytics.by_outcome.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["z", "a"]);
    }

    #[test]
    fn empty_records_give_no_recommendations() {
        let analytics = aggregate(&[]);
        assert!(recommend(&analytics, &OutcomeReferences::default(), 0.7).is_empty());
    }

    #[test]
    fn remediates_outcomes_below_threshold() {
        let analytics = aggregate(&[
            record(&[], "weak", false),
            record(&[], "strong", true),
            record(&[], "weak", true),
            record(&[], "weak", false),
        ]);
        let recs = recommend(&analytics, &OutcomeReferences::default(), 0.7);
        assert_eq!(recs.len(), 1);
        match &recs[0] {
            Recommendation::Remediate {
                outcome_id,
                reference,
                ..
            } => {
                assert_eq!(outcome_id, "weak");
                assert_eq!(reference, &None);
            }
            other => panic!("unexpected recommendation {other:?}"),
        }
    }

    #[test]
    fn exactly_seventy_percent_is_not_remediated() {
        let mut records = vec![record(&[], "o", true); 7];
        records.extend(vec![record(&[], "o", false); 3]);
        let recs = recommend(&aggregate(&records), &OutcomeReferences::default(), 0.7);
        assert_eq!(recs, vec![Recommendation::Reinforce]);
    }

    #[test]
    fn records_without_outcome_are_not_remediated() {
        let records = vec![record(&["t"], "", false), record(&["t"], "o", true)];
        let analytics = aggregate(&records);
        assert_eq!(analytics.overall, Tally::new(1, 2));
        assert_eq!(analytics.by_tag.get("t"), Some(Tally::new(1, 2)));
        assert_eq!(analytics.by_outcome.len(), 1);
        assert_eq!(analytics.by_outcome.get(""), None);

        let recs = recommend(&analytics, &OutcomeReferences::default(), 0.7);
        assert_eq!(recs, vec![Recommendation::Reinforce]);
    }

    #[test]
    fn untagged_outcome_table_is_never_recommended() {
        let analytics = Analytics {
            overall: Tally::new(0, 1),
            by_tag: TallyTable::default(),
            by_outcome: TallyTable::from(vec![(String::new(), Tally::new(0, 1))]),
        };
        let recs = recommend(&analytics, &OutcomeReferences::default(), 0.7);
        assert_eq!(recs, vec![Recommendation::Reinforce]);
    }

    #[test]
    fn sub_questions_inherit_case_outcome() {
        let json = r#"[{
            "id": "case1",
            "type": "case",
            "stem": "Scenario",
            "outcomeId": "clinical",
            "context": "A patient presents...",
            "questions": [
                {"id": "s1", "type": "short", "stem": "Why?", "accepted": ["x"],
                 "reference": "ref://clinical-notes"}
            ]
        }]"#;
        let bank = crate::question::QuestionBank::from_json(json).unwrap();
        let parent = bank.get(0).unwrap();
        let sub = &parent.sub_questions()[0];

        let record = AttemptRecord::within_case(sub, parent, false);
        assert_eq!(record.outcome_id, "clinical");

        let references = OutcomeReferences::from_questions(bank.questions());
        assert_eq!(references.get("clinical"), Some("ref://clinical-notes"));
        assert_eq!(references.get(""), None);
    }

    #[test]
    fn reinforce_message_mentions_adaptive() {
        assert!(Recommendation::Reinforce.to_string().contains("adaptive"));
    }

    #[test]
    fn tally_table_serializes_in_order() {
        let analytics = aggregate(&[record(&["b"], "o", true), record(&["a"], "o", false)]);
        let json = serde_json::to_string(&analytics.by_tag).unwrap();
        assert_eq!(
            json,
            r#"[["b",{"correct":1,"total":1}],["a",{"correct":0,"total":1}]]"#
        );
        let back: TallyTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, analytics.by_tag);
    }
}
