//! Assessment and spaced-repetition engine.
//!
//! Provides:
//! - Question model with eight variants and a total answer validator
//! - Practice, adaptive and exam sessions over a static question bank
//! - Per-tag and per-outcome analytics with remediation recommendations
//! - Ease-adjusted spaced repetition scheduling over a pluggable card store
//! - Flashcard deck parsing, typed-answer matching and CSV exports

pub mod algorithm;
pub mod analytics;
pub mod error;
pub mod export;
pub mod grading;
pub mod matching;
pub mod parser;
pub mod question;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod store;
pub mod types;
pub mod validate;

pub use algorithm::{ease::EaseSchedule, SchedulingAlgorithm};
pub use analytics::{
    aggregate, recommend, Analytics, AttemptRecord, OutcomeReferences, Recommendation, Tally,
    TallyTable,
};
pub use error::{
    ExportError, ParseError, SessionError, SettingsError, StoreError, ValidationError,
};
pub use export::{answer_text, export_flashcards, export_questions};
pub use grading::{check, is_answered};
pub use matching::{compare_answers, compare_with_settings, MatchResult};
pub use parser::{derive_key, parse_deck};
pub use question::{Answer, Choice, MatchPair, Question, QuestionBank, QuestionKind, QuestionType};
pub use scheduler::{DeckStats, Scheduler, StudyQueue};
pub use session::timer::{NoTimer, ThreadTimer, TimerFacility, TimerHandle};
pub use session::{Feedback, FinishReason, Session, SessionMode, SessionReport, SubmitOutcome};
pub use settings::{
    EngineSettings, MatchingSettings, SchedulerSettings, SessionOverrides, SessionSettings,
    StudyLimits,
};
pub use store::{CardStore, JsonFileCardStore, MemoryCardStore};
pub use types::{Card, CardMap, Flashcard, Grade, MatchingMode};
pub use validate::{validate_bank, validate_question};
