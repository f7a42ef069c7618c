//! Flashcard deck parser.
//!
//! # Format
//! ```text
//! ID: pharm-dose-1
//! Q: Maximum daily paracetamol dose for adults?
//! A: 4 g
//!
//! Q: Name two signs of anaphylaxis
//! A: Airway swelling
//! Hypotension
//! ```
//!
//! `ID:` and `Q:` start a new card; text lines continue the current field.
//!
//! Cards without an `ID:` line get a key derived from their front text.

use crate::error::{ParseError, Result};
use crate::types::Flashcard;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Parse deck content into flashcards.
pub fn parse_deck(content: &str) -> Result<Vec<Flashcard>> {
    let mut parser = Parser::new();

    for (idx, line) in content.lines().enumerate() {
        parser.process_line(line, idx + 1)?;
    }

    parser.finalize()
}

/// Stable key for a card without an explicit ID.
pub fn derive_key(front: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(front.trim().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("fc-{}", &digest[..12])
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Question,
    Answer,
}

struct CardBuilder {
    key: Option<String>,
    question: Option<String>,
    answer: Option<String>,
    start_line: usize,
}

impl CardBuilder {
    fn new(start_line: usize) -> Self {
        Self {
            key: None,
            question: None,
            answer: None,
            start_line,
        }
    }

    fn build(self) -> Result<Flashcard> {
        let front = self.question.ok_or(ParseError::MissingQuestion {
            line: self.start_line,
        })?;
        let back = self.answer.ok_or(ParseError::MissingAnswer {
            line: self.start_line,
        })?;
        let front = front.trim().to_string();

        Ok(Flashcard {
            key: self.key.unwrap_or_else(|| derive_key(&front)),
            front,
            back: back.trim().to_string(),
            line_number: self.start_line,
        })
    }
}

struct Parser {
    current: Option<CardBuilder>,
    current_field: Option<Field>,
    buffer: Vec<String>,
    cards: Vec<Flashcard>,
    seen_keys: HashSet<String>,
}

impl Parser {
    fn new() -> Self {
        Self {
            current: None,
            current_field: None,
            buffer: Vec::new(),
            cards: Vec::new(),
            seen_keys: HashSet::new(),
        }
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<()> {
        match Self::parse_line(line) {
            LineType::Id(key) => self.handle_id(key, line_num)?,
            LineType::Question(text) => self.handle_question(text, line_num)?,
            LineType::Answer(text) => self.handle_answer(text, line_num),
            LineType::Text(text) => self.buffer.push(text.to_string()),
            LineType::Empty => self.buffer.push(String::new()),
        }
        Ok(())
    }

    fn parse_line(line: &str) -> LineType<'_> {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("ID:") {
            LineType::Id(rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("Q:") {
            LineType::Question(rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("A:") {
            LineType::Answer(rest.trim())
        } else if trimmed.is_empty() {
            LineType::Empty
        } else {
            LineType::Text(line)
        }
    }

    /// Whether the card in progress already has content, so a new `ID:` or
    /// `Q:` line starts the next card.
    fn current_has_content(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|card| card.question.is_some() || card.answer.is_some())
            || self.current_field.is_some()
    }

    fn handle_id(&mut self, key: &str, line_num: usize) -> Result<()> {
        if key.is_empty() {
            return Err(ParseError::EmptyId { line: line_num });
        }
        if self.current_has_content() {
            self.complete_card()?;
        }
        self.buffer.clear();

        let card = self.current.get_or_insert_with(|| CardBuilder::new(line_num));
        card.key = Some(key.to_string());
        self.current_field = None;
        Ok(())
    }

    fn handle_question(&mut self, text: &str, line_num: usize) -> Result<()> {
        if self.current_has_content() {
            self.complete_card()?;
        }
        self.buffer.clear();

        // Card without ID starts here
        self.current.get_or_insert_with(|| CardBuilder::new(line_num));
        self.current_field = Some(Field::Question);
        self.buffer.push(text.to_string());
        Ok(())
    }

    fn handle_answer(&mut self, text: &str, line_num: usize) {
        self.flush_buffer();
        self.current.get_or_insert_with(|| CardBuilder::new(line_num));
        self.current_field = Some(Field::Answer);
        self.buffer.push(text.to_string());
    }

    fn flush_buffer(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let content = self.buffer.join("\n");
        self.buffer.clear();

        if let Some(ref mut card) = self.current {
            match self.current_field {
                Some(Field::Question) => card.question = Some(content),
                Some(Field::Answer) => card.answer = Some(content),
                None => {}
            }
        }
    }

    fn complete_card(&mut self) -> Result<()> {
        self.flush_buffer();
        self.current_field = None;

        let Some(builder) = self.current.take() else {
            return Ok(());
        };
        let card = builder.build()?;
        if !self.seen_keys.insert(card.key.clone()) {
            return Err(ParseError::DuplicateKey {
                key: card.key,
                line: card.line_number,
            });
        }
        self.cards.push(card);
        Ok(())
    }

    fn finalize(mut self) -> Result<Vec<Flashcard>> {
        self.complete_card()?;
        Ok(self.cards)
    }
}

enum LineType<'a> {
    Id(&'a str),
    Question(&'a str),
    Answer(&'a str),
    Text(&'a str),
    Empty,
}
