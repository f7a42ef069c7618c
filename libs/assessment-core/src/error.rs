//! Error types for assessment-core.

use thiserror::Error;

/// Result type alias using ParseError.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that can occur while parsing a flashcard deck.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing question at line {line}")]
    MissingQuestion { line: usize },

    #[error("missing answer at line {line}")]
    MissingAnswer { line: usize },

    #[error("empty ID at line {line}")]
    EmptyId { line: usize },

    #[error("duplicate key {key} at line {line}")]
    DuplicateKey { key: String, line: usize },
}

/// Errors raised by the session controller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session is already finished")]
    Finished,

    #[error("question {question_id} is not fully answered")]
    NotAnswered { question_id: String },

    #[error("question bank is empty")]
    EmptyBank,

    #[error("invalid session settings: {reason}")]
    InvalidSettings { reason: String },
}

/// Errors raised by a card store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while writing CSV exports.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV writer: {0}")]
    Flush(String),

    #[error("export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Errors raised while loading engine settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Authoring defects found by offline question bank validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("duplicate question id {id}")]
    DuplicateId { id: String },

    #[error("question {id} has no choices")]
    EmptyChoices { id: String },

    #[error("mcq {id} must have exactly one correct choice, found {found}")]
    McqCorrectCount { id: String, found: usize },

    #[error("multi {id} has no correct choice")]
    MultiNoCorrect { id: String },

    #[error("question {id} repeats choice id {choice_id}")]
    DuplicateChoiceId { id: String, choice_id: String },

    #[error("match {id} has no pairs")]
    EmptyPairs { id: String },

    #[error("match {id} maps left key {left} more than once")]
    DuplicateMatchLeft { id: String, left: String },

    #[error("match {id} reuses right value {right}")]
    DuplicateMatchRight { id: String, right: String },

    #[error("order {id} has no items")]
    EmptyOrder { id: String },

    #[error("cloze {id} has {gaps} gaps but {answers} answers")]
    ClozeGapMismatch { id: String, gaps: usize, answers: usize },

    #[error("short {id} has no accepted answers")]
    EmptyAccepted { id: String },

    #[error("numeric {id} has an invalid tolerance")]
    InvalidTolerance { id: String },

    #[error("numeric {id} expects a non-finite number")]
    NonFiniteExpected { id: String },

    #[error("case {id} has no sub-questions")]
    EmptyCase { id: String },

    #[error("case {id} nests another case {child_id}")]
    NestedCase { id: String, child_id: String },
}

impl ValidationError {
    /// Id of the question the defect belongs to.
    pub fn question_id(&self) -> &str {
        match self {
            Self::DuplicateId { id }
            | Self::EmptyChoices { id }
            | Self::McqCorrectCount { id, .. }
            | Self::MultiNoCorrect { id }
            | Self::DuplicateChoiceId { id, .. }
            | Self::EmptyPairs { id }
            | Self::DuplicateMatchLeft { id, .. }
            | Self::DuplicateMatchRight { id, .. }
            | Self::EmptyOrder { id }
            | Self::ClozeGapMismatch { id, .. }
            | Self::EmptyAccepted { id }
            | Self::InvalidTolerance { id }
            | Self::NonFiniteExpected { id }
            | Self::EmptyCase { id }
            | Self::NestedCase { id, .. } => id,
        }
    }
}
