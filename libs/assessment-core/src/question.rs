//! Question model: a closed set of eight question variants.
//!
//! Questions are pure data supplied by an external content source. The
//! JSON form is discriminated by a `type` field:
//!
//! ```json
//! { "id": "q1", "type": "mcq", "stem": "2 + 2?", "outcomeId": "arith",
//!   "tags": ["math"], "choices": [{ "id": "a", "text": "4", "correct": true }] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// A single question with its variant payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub stem: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub outcome_id: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// Variant-specific payload, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Single choice; exactly one choice is correct.
    Mcq { choices: Vec<Choice> },
    /// Multiple choice; at least one choice is correct.
    Multi { choices: Vec<Choice> },
    /// Match each left key to its right value.
    Match { pairs: Vec<MatchPair> },
    /// Put the items in the listed order.
    Order { items: Vec<String> },
    /// Fill the gaps (runs of three or more underscores) in `template`.
    Cloze { template: String, answers: Vec<String> },
    /// Free text; correct if it contains any accepted substring.
    Short { accepted: Vec<String> },
    /// A number within `tolerance` of `expected`.
    Numeric {
        expected: f64,
        #[serde(default)]
        tolerance: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    /// A scenario with its own sub-questions.
    Case {
        context: String,
        questions: Vec<Question>,
    },
}

/// One selectable option of an `mcq` or `multi` question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub correct: bool,
}

/// Expected left-to-right mapping of a `match` question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub left: String,
    pub right: String,
}

/// Short name of each variant, as used in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    Multi,
    Match,
    Order,
    Cloze,
    Short,
    Numeric,
    Case,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mcq => "mcq",
            Self::Multi => "multi",
            Self::Match => "match",
            Self::Order => "order",
            Self::Cloze => "cloze",
            Self::Short => "short",
            Self::Numeric => "numeric",
            Self::Case => "case",
        }
    }
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        match self.kind {
            QuestionKind::Mcq { .. } => QuestionType::Mcq,
            QuestionKind::Multi { .. } => QuestionType::Multi,
            QuestionKind::Match { .. } => QuestionType::Match,
            QuestionKind::Order { .. } => QuestionType::Order,
            QuestionKind::Cloze { .. } => QuestionType::Cloze,
            QuestionKind::Short { .. } => QuestionType::Short,
            QuestionKind::Numeric { .. } => QuestionType::Numeric,
            QuestionKind::Case { .. } => QuestionType::Case,
        }
    }

    /// Sub-questions of a `case`, empty for every other variant.
    pub fn sub_questions(&self) -> &[Question] {
        match &self.kind {
            QuestionKind::Case { questions, .. } => questions,
            _ => &[],
        }
    }
}

/// A learner's submitted value for one question.
///
/// The shape must match the question variant; a mismatched shape grades
/// as incorrect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    /// Selected choice id (`mcq`).
    Choice(String),
    /// Selected choice ids in any order (`multi`).
    Choices(Vec<String>),
    /// Items in submitted order (`order`).
    Sequence(Vec<String>),
    /// Gap values in template order (`cloze`).
    Gaps(Vec<String>),
    /// Free text (`short`).
    Text(String),
    /// Number (`numeric`).
    Number(f64),
    /// Left key to chosen right value (`match`).
    Mapping(HashMap<String, String>),
    /// Sub-question id to its answer (`case`).
    Case(HashMap<String, Answer>),
}

/// Immutable, cheaply cloneable ordered list of questions.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Arc<[Question]>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions: questions.into(),
        }
    }

    /// Parse a bank from its JSON array form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Ok(Self::new(questions))
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }
}

impl From<Vec<Question>> for QuestionBank {
    fn from(questions: Vec<Question>) -> Self {
        Self::new(questions)
    }
}
