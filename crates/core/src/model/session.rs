use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::model::answer::Answer;
use crate::model::ids::QuestionId;
use crate::model::question::{Question, QuestionSet};
use crate::model::result::{QuizResult, project_result, score_percent};
use crate::time::millis_between;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("question set has no questions")]
    InvalidContent,

    #[error("cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("option {selected} is out of range for a question with {options} options")]
    OptionOutOfRange { selected: usize, options: usize },
}

//
// ─── STATE ────────────────────────────────────────────────────────────────────
//

/// Lifecycle of a single attempt. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::NotStarted => "not started",
            SessionState::InProgress => "in progress",
            SessionState::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// Outcome of [`QuizSession::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The current question has no answer yet; nothing moved.
    NotAnswered,
    /// The cursor moved to the next question.
    Continue,
    /// The last question was passed; the session is now completed.
    Completed,
}

/// Holds the result once it has been fixed for this session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResultSlot {
    #[default]
    Unset,
    Pinned(QuizResult),
}

impl ResultSlot {
    #[must_use]
    pub fn pinned(&self) -> Option<&QuizResult> {
        match self {
            ResultSlot::Unset => None,
            ResultSlot::Pinned(result) => Some(result),
        }
    }
}

/// Snapshot of how far an attempt has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

/// State machine for one attempt at a question set.
///
/// Holds at most one answer per question; answering again replaces the
/// earlier verdict in place. Timestamps are supplied by the caller so the
/// session itself never reads the wall clock.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    state: SessionState,
    questions: Option<Arc<QuestionSet>>,
    cursor: usize,
    answers: Vec<Answer>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    result: ResultSlot,
}

impl QuizSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin the attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless the session is `NotStarted`,
    /// and `SessionError::InvalidContent` for an empty set. Neither changes state.
    pub fn start(
        &mut self,
        questions: Arc<QuestionSet>,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        self.require(SessionState::NotStarted, "start")?;
        if questions.is_empty() {
            return Err(SessionError::InvalidContent);
        }

        self.questions = Some(questions);
        self.cursor = 0;
        self.answers.clear();
        self.started_at = Some(now);
        self.completed_at = None;
        self.result = ResultSlot::Unset;
        self.state = SessionState::InProgress;
        Ok(())
    }

    /// Record a selection for the current question, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` outside `InProgress` and
    /// `SessionError::OptionOutOfRange` if `selected_option` is not an option index.
    pub fn answer(&mut self, selected_option: usize) -> Result<Answer, SessionError> {
        self.require(SessionState::InProgress, "answer")?;
        let answer = {
            let question = self.current_question().ok_or(SessionError::InvalidState {
                operation: "answer",
                state: self.state,
            })?;
            if selected_option >= question.options.len() {
                return Err(SessionError::OptionOutOfRange {
                    selected: selected_option,
                    options: question.options.len(),
                });
            }
            Answer::grade(question, selected_option)
        };

        match self
            .answers
            .iter_mut()
            .find(|a| a.question_id == answer.question_id)
        {
            Some(existing) => *existing = answer,
            None => self.answers.push(answer),
        }
        Ok(answer)
    }

    /// True when the question under the cursor has an answer.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.current_question()
            .is_some_and(|q| self.answer_for(q.id).is_some())
    }

    /// Move past the current question, completing the session after the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` outside `InProgress`. An unanswered
    /// question is reported as `Advance::NotAnswered`, not as an error.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance, SessionError> {
        self.require(SessionState::InProgress, "advance")?;
        if !self.can_advance() {
            return Ok(Advance::NotAnswered);
        }

        if self.is_last_question() {
            self.completed_at = Some(now);
            self.state = SessionState::Completed;
            return Ok(Advance::Completed);
        }

        self.cursor += 1;
        Ok(Advance::Continue)
    }

    /// Fix the result for this session; later reads return it unchanged.
    pub fn pin_result(&mut self, result: QuizResult) {
        self.result = ResultSlot::Pinned(result);
    }

    /// The pinned result, or a freshly derived one once every question is answered.
    #[must_use]
    pub fn result(&self, now: DateTime<Utc>) -> Option<QuizResult> {
        project_result(self, self.result.pinned(), now)
    }

    #[must_use]
    pub fn result_slot(&self) -> &ResultSlot {
        &self.result
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn question_set(&self) -> Option<&QuestionSet> {
        self.questions.as_deref()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.state == SessionState::NotStarted {
            return None;
        }
        self.questions.as_ref()?.get(self.cursor)
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.questions
            .as_ref()
            .is_none_or(|set| self.cursor + 1 >= set.len())
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    #[must_use]
    pub fn answer_for(&self, question_id: QuestionId) -> Option<&Answer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }

    /// True when every question in the set has an answer, wherever the cursor is.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.questions.as_ref().is_some_and(|set| {
            set.questions()
                .iter()
                .all(|q| self.answer_for(q.id).is_some())
        })
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.as_ref().map_or(0, |set| set.len())
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }

    #[must_use]
    pub fn score(&self) -> u8 {
        score_percent(self.correct_count(), self.total_questions())
    }

    /// Elapsed attempt time in milliseconds.
    ///
    /// Uses the recorded end when it is set and not before the start. With only
    /// a start recorded, `now` stands in for the end. Zero before `start`.
    #[must_use]
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) if end >= start => millis_between(start, end),
            (Some(start), _) => millis_between(start, now),
            _ => 0,
        }
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.total_questions();
        let answered = self.answers.len();
        SessionProgress {
            total,
            answered,
            remaining: total.saturating_sub(answered),
            is_complete: self.is_completed(),
        }
    }

    fn require(&self, expected: SessionState, operation: &'static str) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
