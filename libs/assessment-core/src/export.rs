//! CSV exports of flashcards and questions.
//!
//! Fields containing a comma, quote or newline are quoted with internal
//! quotes doubled.

use crate::error::ExportError;
use crate::question::{Choice, Question, QuestionKind};
use crate::types::Flashcard;

pub type Result<T> = std::result::Result<T, ExportError>;

/// Export flashcards as `Front,Back`.
pub fn export_flashcards(cards: &[Flashcard]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Front", "Back"])?;
    for card in cards {
        writer.write_record([card.front.as_str(), card.back.as_str()])?;
    }
    finish(writer)
}

/// Export questions as `id,type,stem,answer/explanation`.
pub fn export_questions(questions: &[Question]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["id", "type", "stem", "answer/explanation"])?;
    for question in questions {
        let answer = answer_text(question);
        let cell = if answer.is_empty() {
            question.explanation.clone().unwrap_or_default()
        } else {
            answer
        };
        writer.write_record([
            question.id.as_str(),
            question.question_type().as_str(),
            question.stem.as_str(),
            cell.as_str(),
        ])?;
    }
    finish(writer)
}

/// Human-readable expected answer of a question.
pub fn answer_text(question: &Question) -> String {
    match &question.kind {
        QuestionKind::Mcq { choices } | QuestionKind::Multi { choices } => correct_texts(choices),
        QuestionKind::Match { pairs } => pairs
            .iter()
            .map(|p| format!("{}→{}", p.left, p.right))
            .collect::<Vec<_>>()
            .join(" ; "),
        QuestionKind::Order { items } => items.join(" → "),
        QuestionKind::Cloze { answers, .. } => answers.join(" | "),
        QuestionKind::Short { accepted } => accepted.join(" | "),
        QuestionKind::Numeric {
            expected,
            tolerance,
            unit,
        } => match unit {
            Some(unit) => format!("{} ± {} {}", expected, tolerance, unit),
            None => format!("{} ± {}", expected, tolerance),
        },
        QuestionKind::Case { questions, .. } => questions
            .iter()
            .map(|q| format!("{}: {}", q.id, answer_text(q)))
            .collect::<Vec<_>>()
            .join(" // "),
    }
}

fn correct_texts(choices: &[Choice]) -> String {
    choices
        .iter()
        .filter(|c| c.correct)
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" | ")
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
