//! Answer validation.
//!
//! `check` is total: a missing answer, an answer of the wrong shape, or a
//! malformed question all grade as incorrect rather than failing.

use crate::question::{Answer, Choice, MatchPair, Question, QuestionKind};
use std::collections::{HashMap, HashSet};

/// Grade a submitted answer against a question.
pub fn check(question: &Question, answer: Option<&Answer>) -> bool {
    let Some(answer) = answer else {
        return false;
    };

    match (&question.kind, answer) {
        (QuestionKind::Mcq { choices }, Answer::Choice(id)) => check_mcq(choices, id),
        (QuestionKind::Multi { choices }, Answer::Choices(ids)) => check_multi(choices, ids),
        (QuestionKind::Order { items }, Answer::Sequence(submitted)) => {
            !items.is_empty() && items == submitted
        }
        (QuestionKind::Cloze { template, answers }, Answer::Gaps(gaps)) => {
            check_cloze(template, answers, gaps)
        }
        (QuestionKind::Short { accepted }, Answer::Text(text)) => check_short(accepted, text),
        (
            QuestionKind::Numeric {
                expected,
                tolerance,
                ..
            },
            Answer::Number(value),
        ) => check_numeric(*expected, *tolerance, *value),
        (QuestionKind::Match { pairs }, Answer::Mapping(mapping)) => check_match(pairs, mapping),
        (QuestionKind::Case { questions, .. }, Answer::Case(sub_answers)) => {
            check_case(questions, sub_answers)
        }
        _ => false,
    }
}

/// Whether every required input of a question has been supplied.
///
/// Only shape and presence are checked, not correctness. For a `case`
/// every sub-question needs its own answer.
pub fn is_answered(question: &Question, answer: Option<&Answer>) -> bool {
    let Some(answer) = answer else {
        return false;
    };

    match (&question.kind, answer) {
        (QuestionKind::Mcq { .. }, Answer::Choice(id)) => !id.is_empty(),
        (QuestionKind::Multi { .. }, Answer::Choices(ids)) => !ids.is_empty(),
        (QuestionKind::Order { .. }, Answer::Sequence(items)) => !items.is_empty(),
        (QuestionKind::Cloze { template, .. }, Answer::Gaps(gaps)) => {
            gaps.len() == count_gaps(template) && gaps.iter().all(|g| !g.trim().is_empty())
        }
        (QuestionKind::Short { .. }, Answer::Text(text)) => !text.trim().is_empty(),
        (QuestionKind::Numeric { .. }, Answer::Number(value)) => value.is_finite(),
        (QuestionKind::Match { pairs }, Answer::Mapping(mapping)) => pairs
            .iter()
            .all(|p| mapping.get(&p.left).is_some_and(|v| !v.trim().is_empty())),
        (QuestionKind::Case { questions, .. }, Answer::Case(sub_answers)) => questions
            .iter()
            .all(|q| is_answered(q, sub_answers.get(&q.id))),
        _ => false,
    }
}

/// Number of gaps in a cloze template.
///
/// A gap is a maximal run of three or more underscores.
pub fn count_gaps(template: &str) -> usize {
    let mut gaps = 0;
    let mut run = 0;
    for c in template.chars().chain(std::iter::once('\0')) {
        if c == '_' {
            run += 1;
        } else {
            if run >= 3 {
                gaps += 1;
            }
            run = 0;
        }
    }
    gaps
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

fn check_mcq(choices: &[Choice], submitted: &str) -> bool {
    let mut correct = choices.iter().filter(|c| c.correct);
    match (correct.next(), correct.next()) {
        (Some(only), None) => only.id == submitted,
        _ => false,
    }
}

fn check_multi(choices: &[Choice], submitted: &[String]) -> bool {
    let expected: HashSet<&str> = choices
        .iter()
        .filter(|c| c.correct)
        .map(|c| c.id.as_str())
        .collect();
    if expected.is_empty() {
        return false;
    }
    let submitted: HashSet<&str> = submitted.iter().map(String::as_str).collect();
    expected == submitted
}

fn check_cloze(template: &str, expected: &[String], submitted: &[String]) -> bool {
    if expected.is_empty() || expected.len() != count_gaps(template) {
        return false;
    }
    expected.len() == submitted.len()
        && expected
            .iter()
            .zip(submitted)
            .all(|(e, s)| normalize(e) == normalize(s))
}

fn check_short(accepted: &[String], submitted: &str) -> bool {
    let submitted = normalize(submitted);
    accepted
        .iter()
        .map(|a| normalize(a))
        .filter(|a| !a.is_empty())
        .any(|a| submitted.contains(&a))
}

fn check_numeric(expected: f64, tolerance: f64, submitted: f64) -> bool {
    if !(expected.is_finite() && tolerance.is_finite() && submitted.is_finite()) || tolerance < 0.0
    {
        return false;
    }
    (submitted - expected).abs() <= tolerance
}

fn check_match(pairs: &[MatchPair], submitted: &HashMap<String, String>) -> bool {
    if pairs.is_empty() {
        return false;
    }
    let mut seen = HashSet::new();
    if !pairs.iter().all(|p| seen.insert(p.left.as_str())) {
        return false;
    }
    pairs.iter().all(|p| {
        submitted
            .get(&p.left)
            .is_some_and(|value| normalize(value) == normalize(&p.right))
    })
}

fn check_case(questions: &[Question], submitted: &HashMap<String, Answer>) -> bool {
    if questions.is_empty() {
        return false;
    }
    questions.iter().all(|q| {
        !matches!(q.kind, QuestionKind::Case { .. }) && check(q, submitted.get(&q.id))
    })
}
