//! Assessment session controller.
//!
//! A session walks a queue of question indices over a fixed bank. The
//! queue only grows: in adaptive mode a missed question's index is pushed
//! to the back for another attempt. Once finished, a session only answers
//! reads.

pub mod timer;

use crate::analytics::{
    aggregate, recommend, Analytics, AttemptRecord, OutcomeReferences, Recommendation,
};
use crate::error::SessionError;
use crate::grading::{check, is_answered};
use crate::question::{Answer, Question, QuestionBank, QuestionKind};
use crate::settings::SessionSettings;
use crate::validate::validate_bank;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use timer::{TimerFacility, TimerHandle};
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, SessionError>;

/// How a session orders questions and shows feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Linear walk, feedback after each answer.
    Practice,
    /// Missed questions are requeued, feedback after each answer.
    Adaptive,
    /// Timed, feedback only once finished.
    Exam,
}

/// Why a session reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Completed,
    TimeExpired,
    EndedEarly,
}

/// Per-question feedback shown to the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub question_id: String,
    pub correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub question_id: String,
    pub correct: bool,
    pub requeued: bool,
    /// `None` in exam mode until the session is finished.
    pub feedback: Option<Feedback>,
    pub finished: bool,
}

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub mode: SessionMode,
    pub finish_reason: FinishReason,
    pub analytics: Analytics,
    pub recommendations: Vec<Recommendation>,
    pub score_percent: f64,
}

/// One learner's pass over a question bank.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    mode: SessionMode,
    bank: QuestionBank,
    settings: SessionSettings,
    queue: Vec<usize>,
    position: usize,
    answers: HashMap<String, Answer>,
    records: Vec<AttemptRecord>,
    graded: HashMap<String, bool>,
    remaining_seconds: Option<u32>,
    finished: Option<FinishReason>,
    timer: Option<TimerHandle>,
    /// Set once a timer facility reported no timer; exams stay untimed.
    untimed: bool,
}

impl Session {
    /// Start a session over `bank` in bank order.
    ///
    /// Fails on an empty bank or settings that do not validate.
    pub fn new(bank: QuestionBank, mode: SessionMode, settings: SessionSettings) -> Result<Self> {
        if bank.is_empty() {
            return Err(SessionError::EmptyBank);
        }
        settings
            .validate()
            .map_err(|e| SessionError::InvalidSettings {
                reason: e.to_string(),
            })?;

        for defect in validate_bank(bank.questions()) {
            tracing::warn!(question_id = defect.question_id(), "Malformed question: {}", defect);
        }

        let mut session = Self {
            id: Uuid::new_v4(),
            mode,
            bank,
            settings,
            queue: Vec::new(),
            position: 0,
            answers: HashMap::new(),
            records: Vec::new(),
            graded: HashMap::new(),
            remaining_seconds: None,
            finished: None,
            timer: None,
            untimed: false,
        };
        session.reset_state();
        Ok(session)
    }

    fn reset_state(&mut self) {
        self.queue = (0..self.bank.len()).collect();
        self.position = 0;
        self.answers.clear();
        self.records.clear();
        self.graded.clear();
        self.finished = None;
        self.remaining_seconds = match self.mode {
            SessionMode::Exam if !self.untimed => Some(self.settings.exam_duration_secs),
            _ => None,
        };
        tracing::info!(
            session_id = %self.id,
            mode = ?self.mode,
            questions = self.bank.len(),
            "Session started"
        );
    }

    /// Throw away all progress and start over with a fresh id.
    ///
    /// Any running timer is cancelled first; attach a new one to time the
    /// restarted exam. An exam that fell back to untimed stays untimed.
    pub fn restart(&mut self) {
        self.cancel_timer();
        tracing::info!(session_id = %self.id, "Session restarted");
        self.id = Uuid::new_v4();
        self.reset_state();
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Live queue of bank indices.
    pub fn queue(&self) -> &[usize] {
        &self.queue
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn records(&self) -> &[AttemptRecord] {
        &self.records
    }

    /// Latest submitted answer for a question.
    pub fn answer(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    /// Seconds left in an exam; `None` for untimed sessions.
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.remaining_seconds
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finished
    }

    /// Bank index of the question being asked.
    pub fn current_index(&self) -> Option<usize> {
        if self.is_finished() {
            return None;
        }
        self.queue.get(self.position).copied()
    }

    pub fn current(&self) -> Option<&Question> {
        self.current_index().and_then(|index| self.bank.get(index))
    }

    /// `position / queue length`. The queue grows in adaptive mode, so
    /// this can move backwards.
    pub fn progress(&self) -> f64 {
        self.position as f64 / self.queue.len() as f64
    }

    /// Whether `answer` supplies every input the current question needs.
    pub fn can_submit(&self, answer: Option<&Answer>) -> bool {
        self.current().is_some_and(|q| is_answered(q, answer))
    }

    /// Grade an answer to the current question and advance.
    pub fn submit(&mut self, answer: Answer) -> Result<SubmitOutcome> {
        let index = self.current_index().ok_or(SessionError::Finished)?;
        let question = self.bank.get(index).ok_or(SessionError::Finished)?.clone();

        if !is_answered(&question, Some(&answer)) {
            return Err(SessionError::NotAnswered {
                question_id: question.id.clone(),
            });
        }

        let correct = check(&question, Some(&answer));
        if let (QuestionKind::Case { questions, .. }, Answer::Case(sub_answers)) =
            (&question.kind, &answer)
        {
            for sub in questions {
                let sub_correct = check(sub, sub_answers.get(&sub.id));
                self.records.push(AttemptRecord::within_case(sub, &question, sub_correct));
            }
        }
        self.records.push(AttemptRecord::new(&question, correct));
        self.answers.insert(question.id.clone(), answer);
        self.graded.insert(question.id.clone(), correct);

        let requeued = self.mode == SessionMode::Adaptive && !correct;
        if requeued {
            self.queue.push(index);
            tracing::debug!(
                session_id = %self.id,
                question_id = %question.id,
                queue_len = self.queue.len(),
                "Question requeued"
            );
        }

        self.position += 1;
        tracing::debug!(
            session_id = %self.id,
            question_id = %question.id,
            correct,
            position = self.position,
            "Answer submitted"
        );

        if self.position >= self.queue.len() {
            self.finish_with(FinishReason::Completed);
        }

        Ok(SubmitOutcome {
            feedback: self.feedback(&question.id),
            question_id: question.id,
            correct,
            requeued,
            finished: self.is_finished(),
        })
    }

    /// End the session now. The unanswered current question gets no record.
    pub fn finish(&mut self) -> Result<()> {
        if self.is_finished() {
            return Err(SessionError::Finished);
        }
        self.finish_with(FinishReason::EndedEarly);
        Ok(())
    }

    /// Drive the exam countdown by one second.
    ///
    /// Returns `true` if this tick finished the session. Ticks on a
    /// finished or untimed session are ignored.
    pub fn tick(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        let Some(remaining) = self.remaining_seconds.as_mut() else {
            return false;
        };
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.finish_with(FinishReason::TimeExpired);
            return true;
        }
        false
    }

    /// Start a one-second countdown from `facility`.
    ///
    /// Without a facility the exam degrades to untimed. Non-exam sessions
    /// ignore this.
    pub fn attach_timer(&mut self, facility: &dyn TimerFacility) {
        if self.mode != SessionMode::Exam || self.is_finished() {
            return;
        }
        self.cancel_timer();
        match facility.start(Duration::from_secs(1)) {
            Some(handle) => self.timer = Some(handle),
            None => {
                tracing::warn!(session_id = %self.id, "No timer available, exam is untimed");
                self.untimed = true;
                self.remaining_seconds = None;
            }
        }
    }

    /// Apply ticks delivered by the attached timer.
    pub fn poll_timer(&mut self) {
        let ticks = self.timer.as_ref().map_or(0, TimerHandle::take_ticks);
        for _ in 0..ticks {
            if self.tick() {
                break;
            }
        }
    }

    pub fn has_running_timer(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// Feedback for a graded question. Hidden in exam mode until finished.
    pub fn feedback(&self, question_id: &str) -> Option<Feedback> {
        if self.mode == SessionMode::Exam && !self.is_finished() {
            return None;
        }
        let correct = *self.graded.get(question_id)?;
        let question = self.bank.iter().find(|q| q.id == question_id)?;
        Some(Feedback {
            question_id: question.id.clone(),
            correct,
            explanation: question.explanation.clone(),
            reference: question.reference.clone(),
        })
    }

    /// Analytics and recommendations, once finished.
    pub fn report(&self) -> Option<SessionReport> {
        let finish_reason = self.finished?;
        let analytics = aggregate(&self.records);
        let references = OutcomeReferences::from_questions(self.bank.questions());
        let recommendations =
            recommend(&analytics, &references, self.settings.remediation_threshold);
        Some(SessionReport {
            session_id: self.id,
            mode: self.mode,
            finish_reason,
            score_percent: analytics.overall.accuracy() * 100.0,
            analytics,
            recommendations,
        })
    }

    fn finish_with(&mut self, reason: FinishReason) {
        self.cancel_timer();
        self.finished = Some(reason);
        tracing::info!(
            session_id = %self.id,
            reason = ?reason,
            records = self.records.len(),
            "Session finished"
        );
    }

    fn cancel_timer(&mut self) {
        if let Some(mut handle) = self.timer.take() {
            handle.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::Choice;
    use std::collections::BTreeSet;
    use std::sync::mpsc::{channel, Sender};
    use std::sync::Mutex;

    fn mcq(id: &str) -> Question {
        Question {
            id: id.to_string(),
            stem: format!("Question {id}"),
            explanation: Some(format!("Because {id}")),
            reference: None,
            tags: BTreeSet::from([format!("tag-{id}")]),
            outcome_id: "o1".to_string(),
            kind: QuestionKind::Mcq {
                choices: vec![
                    Choice {
                        id: "right".to_string(),
                        text: "Right".to_string(),
                        correct: true,
                    },
                    Choice {
                        id: "wrong".to_string(),
                        text: "Wrong".to_string(),
                        correct: false,
                    },
                ],
            },
        }
    }

    fn bank(n: usize) -> QuestionBank {
        QuestionBank::new((1..=n).map(|i| mcq(&format!("q{i}"))).collect())
    }

    fn right() -> Answer {
        Answer::Choice("right".to_string())
    }

    fn wrong() -> Answer {
        Answer::Choice("wrong".to_string())
    }

    fn exam_settings(secs: u32) -> SessionSettings {
        SessionSettings {
            exam_duration_secs: secs,
            ..Default::default()
        }
    }

    /// Facility whose ticks are sent by the test.
    #[derive(Default)]
    struct ManualTimer {
        ticks: Mutex<Option<Sender<()>>>,
    }

    impl ManualTimer {
        fn fire(&self, n: usize) {
            let guard = self.ticks.lock().unwrap();
            let tx = guard.as_ref().unwrap();
            for _ in 0..n {
                let _ = tx.send(());
            }
        }
    }

    impl TimerFacility for ManualTimer {
        fn start(&self, _period: Duration) -> Option<TimerHandle> {
            let (tick_tx, tick_rx) = channel();
            let (stop_tx, _stop_rx) = channel();
            *self.ticks.lock().unwrap() = Some(tick_tx);
            Some(TimerHandle::new(tick_rx, stop_tx))
        }
    }

    #[test]
    fn empty_bank_is_rejected() {
        let result = Session::new(
            QuestionBank::new(vec![]),
            SessionMode::Practice,
            Default::default(),
        );
        assert!(matches!(result, Err(SessionError::EmptyBank)));
    }

    #[test]
    fn practice_walks_linearly() {
        let mut session = Session::new(bank(2), SessionMode::Practice, Default::default()).unwrap();
        assert_eq!(session.progress(), 0.0);
        let outcome = session.submit(wrong()).unwrap();
        assert!(!outcome.correct);
        assert!(!outcome.requeued);
        assert_eq!(session.progress(), 0.5);
        let outcome = session.submit(right()).unwrap();
        assert!(outcome.finished);
        assert_eq!(session.queue(), &[0, 1]);
        assert_eq!(session.finish_reason(), Some(FinishReason::Completed));
        assert_eq!(session.submit(right()), Err(SessionError::Finished));
    }

    #[test]
    fn adaptive_requeues_missed_questions() {
        let mut session = Session::new(bank(2), SessionMode::Adaptive, Default::default()).unwrap();
        let outcome = session.submit(wrong()).unwrap();
        assert!(outcome.requeued);
        assert_eq!(session.queue(), &[0, 1, 0]);
        assert!((session.progress() - 1.0 / 3.0).abs() < 1e-9);

        session.submit(right()).unwrap();
        // Missed again on the retry
        session.submit(wrong()).unwrap();
        assert_eq!(session.queue(), &[0, 1, 0, 0]);
        session.submit(right()).unwrap();
        assert!(session.is_finished());
        assert_eq!(session.records().len(), 4);
    }

    #[test]
    fn unanswered_submission_is_rejected() {
        let mut session = Session::new(bank(1), SessionMode::Practice, Default::default()).unwrap();
        let result = session.submit(Answer::Choice(String::new()));
        assert_eq!(
            result,
            Err(SessionError::NotAnswered {
                question_id: "q1".to_string()
            })
        );
        assert!(session.records().is_empty());
        assert_eq!(session.position(), 0);
    }

    #[test]
    fn practice_feedback_is_immediate() {
        let mut session = Session::new(bank(2), SessionMode::Practice, Default::default()).unwrap();
        let outcome = session.submit(right()).unwrap();
        let feedback = outcome.feedback.unwrap();
        assert!(feedback.correct);
        assert_eq!(feedback.explanation.as_deref(), Some("Because q1"));
    }

    #[test]
    fn exam_feedback_waits_for_finish() {
        let mut session = Session::new(bank(2), SessionMode::Exam, exam_settings(60)).unwrap();
        let outcome = session.submit(wrong()).unwrap();
        assert!(outcome.feedback.is_none());
        assert!(session.feedback("q1").is_none());
        assert!(!outcome.requeued);

        session.finish().unwrap();
        assert_eq!(session.finish_reason(), Some(FinishReason::EndedEarly));
        assert!(!session.feedback("q1").unwrap().correct);
        assert!(session.feedback("q2").is_none());
        assert_eq!(session.records().len(), 1);
    }

    #[test]
    fn exam_expires_after_duration() {
        let mut session = Session::new(bank(3), SessionMode::Exam, exam_settings(3)).unwrap();
        assert!(!session.tick());
        assert!(!session.tick());
        assert_eq!(session.remaining_seconds(), Some(1));
        assert!(session.tick());
        assert_eq!(session.finish_reason(), Some(FinishReason::TimeExpired));
        assert!(session.records().is_empty());

        // Late ticks change nothing
        assert!(!session.tick());
        assert_eq!(session.remaining_seconds(), Some(0));
    }

    #[test]
    fn non_exam_sessions_are_untimed() {
        let mut session = Session::new(bank(1), SessionMode::Practice, Default::default()).unwrap();
        assert_eq!(session.remaining_seconds(), None);
        assert!(!session.tick());
        session.attach_timer(&ManualTimer::default());
        assert!(!session.has_running_timer());
    }

    #[test]
    fn attached_timer_drives_countdown_and_is_cancelled() {
        let facility = ManualTimer::default();
        let mut session = Session::new(bank(2), SessionMode::Exam, exam_settings(5)).unwrap();
        session.attach_timer(&facility);
        assert!(session.has_running_timer());

        facility.fire(2);
        session.poll_timer();
        assert_eq!(session.remaining_seconds(), Some(3));

        facility.fire(10);
        session.poll_timer();
        assert!(session.is_finished());
        assert_eq!(session.remaining_seconds(), Some(0));
        assert!(!session.has_running_timer());
    }

    #[test]
    fn completing_exam_cancels_timer() {
        let facility = ManualTimer::default();
        let mut session = Session::new(bank(1), SessionMode::Exam, exam_settings(5)).unwrap();
        session.attach_timer(&facility);
        session.submit(right()).unwrap();
        assert!(!session.has_running_timer());

        facility.fire(5);
        session.poll_timer();
        assert_eq!(session.remaining_seconds(), Some(5));
    }

    #[test]
    fn missing_timer_degrades_to_untimed() {
        let mut session = Session::new(bank(1), SessionMode::Exam, exam_settings(5)).unwrap();
        session.attach_timer(&timer::NoTimer);
        assert_eq!(session.remaining_seconds(), None);
        assert!(!session.tick());
        session.submit(right()).unwrap();
        assert!(session.is_finished());
    }

    #[test]
    fn untimed_fallback_survives_restart() {
        let mut session = Session::new(bank(2), SessionMode::Exam, exam_settings(5)).unwrap();
        session.attach_timer(&timer::NoTimer);
        session.submit(right()).unwrap();

        session.restart();
        assert_eq!(session.remaining_seconds(), None);
        assert!(!session.tick());
        assert!(!session.is_finished());
    }

    #[test]
    fn zero_exam_duration_is_rejected() {
        let result = Session::new(bank(2), SessionMode::Exam, exam_settings(0));
        assert!(matches!(result, Err(SessionError::InvalidSettings { .. })));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let settings = SessionSettings {
            remediation_threshold: 70.0,
            ..Default::default()
        };
        let result = Session::new(bank(1), SessionMode::Practice, settings);
        assert!(matches!(result, Err(SessionError::InvalidSettings { .. })));
    }

    #[test]
    fn restart_resets_state_and_timer() {
        let facility = ManualTimer::default();
        let mut session = Session::new(bank(2), SessionMode::Exam, exam_settings(5)).unwrap();
        let first_id = session.id();
        session.attach_timer(&facility);
        session.submit(right()).unwrap();

        session.restart();
        assert!(!session.has_running_timer());
        assert_ne!(session.id(), first_id);
        assert_eq!(session.position(), 0);
        assert!(session.records().is_empty());
        assert_eq!(session.remaining_seconds(), Some(5));
        assert!(session.answer("q1").is_none());
    }

    #[test]
    fn report_only_when_finished() {
        let mut session = Session::new(bank(1), SessionMode::Practice, Default::default()).unwrap();
        assert!(session.report().is_none());
        session.submit(right()).unwrap();
        let report = session.report().unwrap();
        assert_eq!(report.score_percent, 100.0);
        assert_eq!(report.recommendations, vec![Recommendation::Reinforce]);
    }
}
