//! Question bank builders for integration tests.

use std::collections::{BTreeSet, HashMap};

use assessment_core::{Answer, Choice, MatchPair, Question, QuestionBank, QuestionKind};

fn base(id: &str, outcome: &str, tags: &[&str], kind: QuestionKind) -> Question {
    Question {
        id: id.to_string(),
        stem: format!("Stem for {id}"),
        explanation: Some(format!("Explanation for {id}")),
        reference: Some(format!("ref://{outcome}")),
        tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
        outcome_id: outcome.to_string(),
        kind,
    }
}

/// `mcq` with choices a (correct), b, c.
pub fn mcq(id: &str, outcome: &str, tags: &[&str]) -> Question {
    base(
        id,
        outcome,
        tags,
        QuestionKind::Mcq {
            choices: vec![
                Choice {
                    id: "a".to_string(),
                    text: "Alpha".to_string(),
                    correct: true,
                },
                Choice {
                    id: "b".to_string(),
                    text: "Beta".to_string(),
                    correct: false,
                },
                Choice {
                    id: "c".to_string(),
                    text: "Gamma".to_string(),
                    correct: false,
                },
            ],
        },
    )
}

pub fn numeric(id: &str, outcome: &str, expected: f64, tolerance: f64) -> Question {
    base(
        id,
        outcome,
        &[],
        QuestionKind::Numeric {
            expected,
            tolerance,
            unit: Some("mg".to_string()),
        },
    )
}

pub fn short(id: &str, outcome: &str, accepted: &[&str]) -> Question {
    base(
        id,
        outcome,
        &[],
        QuestionKind::Short {
            accepted: accepted.iter().map(|a| a.to_string()).collect(),
        },
    )
}

pub fn matching(id: &str, outcome: &str, pairs: &[(&str, &str)]) -> Question {
    base(
        id,
        outcome,
        &[],
        QuestionKind::Match {
            pairs: pairs
                .iter()
                .map(|(left, right)| MatchPair {
                    left: left.to_string(),
                    right: right.to_string(),
                })
                .collect(),
        },
    )
}

/// `case` wrapping the given sub-questions.
pub fn case(id: &str, outcome: &str, tags: &[&str], questions: Vec<Question>) -> Question {
    base(
        id,
        outcome,
        tags,
        QuestionKind::Case {
            context: format!("Context for {id}"),
            questions,
        },
    )
}

/// Bank of `n` mcq questions q1..qn sharing outcome `o1`.
pub fn mcq_bank(n: usize) -> QuestionBank {
    QuestionBank::new(
        (1..=n)
            .map(|i| mcq(&format!("q{i}"), "o1", &["core"]))
            .collect(),
    )
}

pub fn choice(id: &str) -> Answer {
    Answer::Choice(id.to_string())
}

pub fn case_answers(pairs: Vec<(&str, Answer)>) -> Answer {
    Answer::Case(
        pairs
            .into_iter()
            .map(|(id, answer)| (id.to_string(), answer))
            .collect::<HashMap<_, _>>(),
    )
}
