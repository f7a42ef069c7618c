//! Offline question bank validation.
//!
//! Reports authoring defects that the grader would otherwise silently
//! score as incorrect. Validation is advisory; sessions still run over a
//! malformed bank.

use crate::error::ValidationError;
use crate::grading::count_gaps;
use crate::question::{Choice, Question, QuestionKind};
use std::collections::HashSet;

/// Validate every question in a bank, including duplicate ids.
pub fn validate_bank(questions: &[Question]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for question in questions {
        if !seen.insert(question.id.as_str()) {
            errors.push(ValidationError::DuplicateId {
                id: question.id.clone(),
            });
        }
        errors.extend(validate_question(question));
    }

    errors
}

/// Validate a single question and, for a `case`, its sub-questions.
pub fn validate_question(question: &Question) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    collect(question, &mut errors);
    errors
}

fn collect(question: &Question, errors: &mut Vec<ValidationError>) {
    let id = || question.id.clone();

    match &question.kind {
        QuestionKind::Mcq { choices } => {
            check_choices(question, choices, errors);
            let found = choices.iter().filter(|c| c.correct).count();
            if !choices.is_empty() && found != 1 {
                errors.push(ValidationError::McqCorrectCount { id: id(), found });
            }
        }
        QuestionKind::Multi { choices } => {
            check_choices(question, choices, errors);
            if !choices.is_empty() && !choices.iter().any(|c| c.correct) {
                errors.push(ValidationError::MultiNoCorrect { id: id() });
            }
        }
        QuestionKind::Match { pairs } => {
            if pairs.is_empty() {
                errors.push(ValidationError::EmptyPairs { id: id() });
            }
            let mut lefts = HashSet::new();
            let mut rights = HashSet::new();
            for pair in pairs {
                if !lefts.insert(pair.left.as_str()) {
                    errors.push(ValidationError::DuplicateMatchLeft {
                        id: id(),
                        left: pair.left.clone(),
                    });
                }
                if !rights.insert(pair.right.trim().to_lowercase()) {
                    errors.push(ValidationError::DuplicateMatchRight {
                        id: id(),
                        right: pair.right.clone(),
                    });
                }
            }
        }
        QuestionKind::Order { items } => {
            if items.is_empty() {
                errors.push(ValidationError::EmptyOrder { id: id() });
            }
        }
        QuestionKind::Cloze { template, answers } => {
            let gaps = count_gaps(template);
            if gaps == 0 || gaps != answers.len() {
                errors.push(ValidationError::ClozeGapMismatch {
                    id: id(),
                    gaps,
                    answers: answers.len(),
                });
            }
        }
        QuestionKind::Short { accepted } => {
            if accepted.iter().all(|a| a.trim().is_empty()) {
                errors.push(ValidationError::EmptyAccepted { id: id() });
            }
        }
        QuestionKind::Numeric {
            expected,
            tolerance,
            ..
        } => {
            if !expected.is_finite() {
                errors.push(ValidationError::NonFiniteExpected { id: id() });
            }
            if !tolerance.is_finite() || *tolerance < 0.0 {
                errors.push(ValidationError::InvalidTolerance { id: id() });
            }
        }
        QuestionKind::Case { questions, .. } => {
            if questions.is_empty() {
                errors.push(ValidationError::EmptyCase { id: id() });
            }
            for child in questions {
                if matches!(child.kind, QuestionKind::Case { .. }) {
                    errors.push(ValidationError::NestedCase {
                        id: id(),
                        child_id: child.id.clone(),
                    });
                } else {
                    collect(child, errors);
                }
            }
        }
    }
}

fn check_choices(question: &Question, choices: &[Choice], errors: &mut Vec<ValidationError>) {
    if choices.is_empty() {
        errors.push(ValidationError::EmptyChoices {
            id: question.id.clone(),
        });
        return;
    }
    let mut seen = HashSet::new();
    for choice in choices {
        if !seen.insert(choice.id.as_str()) {
            errors.push(ValidationError::DuplicateChoiceId {
                id: question.id.clone(),
                choice_id: choice.id.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::MatchPair;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn question(id: &str, kind: QuestionKind) -> Question {
        Question {
            id: id.to_string(),
            stem: "stem".to_string(),
            explanation: None,
            reference: None,
            tags: BTreeSet::new(),
            outcome_id: "o".to_string(),
            kind,
        }
    }

    fn choice(id: &str, correct: bool) -> Choice {
        Choice {
            id: id.to_string(),
            text: id.to_string(),
            correct,
        }
    }

    #[test]
    fn well_formed_bank_has_no_errors() {
        let bank = vec![
            question(
                "q1",
                QuestionKind::Mcq {
                    choices: vec![choice("a", true), choice("b", false)],
                },
            ),
            question(
                "q2",
                QuestionKind::Cloze {
                    template: "___ + ___".to_string(),
                    answers: vec!["1".to_string(), "2".to_string()],
                },
            ),
        ];
        assert!(validate_bank(&bank).is_empty());
    }

    #[test]
    fn reports_duplicate_ids() {
        let q = question(
            "dup",
            QuestionKind::Order {
                items: vec!["x".to_string()],
            },
        );
        let errors = validate_bank(&[q.clone(), q]);
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateId {
                id: "dup".to_string()
            }]
        );
    }

    #[test]
    fn reports_mcq_correct_count() {
        let q = question(
            "m",
            QuestionKind::Mcq {
                choices: vec![choice("a", true), choice("b", true)],
            },
        );
        assert_eq!(
            validate_question(&q),
            vec![ValidationError::McqCorrectCount {
                id: "m".to_string(),
                found: 2
            }]
        );
    }

    #[test]
    fn reports_cloze_mismatch() {
        let q = question(
            "c",
            QuestionKind::Cloze {
                template: "just ___".to_string(),
                answers: vec!["a".to_string(), "b".to_string()],
            },
        );
        assert_eq!(
            validate_question(&q),
            vec![ValidationError::ClozeGapMismatch {
                id: "c".to_string(),
                gaps: 1,
                answers: 2
            }]
        );
    }

    #[test]
    fn reports_match_duplicates() {
        let q = question(
            "mt",
            QuestionKind::Match {
                pairs: vec![
                    MatchPair {
                        left: "a".to_string(),
                        right: "x".to_string(),
                    },
                    MatchPair {
                        left: "a".to_string(),
                        right: "X ".to_string(),
                    },
                ],
            },
        );
        let errors = validate_question(&q);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::DuplicateMatchLeft { .. }));
        assert!(matches!(errors[1], ValidationError::DuplicateMatchRight { .. }));
    }

    #[test]
    fn validates_case_children_and_rejects_nesting() {
        let bad_child = question(
            "child",
            QuestionKind::Numeric {
                expected: 1.0,
                tolerance: -0.5,
                unit: None,
            },
        );
        let inner = question(
            "inner",
            QuestionKind::Case {
                context: String::new(),
                questions: vec![],
            },
        );
        let q = question(
            "outer",
            QuestionKind::Case {
                context: "ctx".to_string(),
                questions: vec![bad_child, inner],
            },
        );
        assert_eq!(
            validate_question(&q),
            vec![
                ValidationError::InvalidTolerance {
                    id: "child".to_string()
                },
                ValidationError::NestedCase {
                    id: "outer".to_string(),
                    child_id: "inner".to_string()
                },
            ]
        );
    }
}
