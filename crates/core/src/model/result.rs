use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::answer::{Answer, ReviewAnswer};
use crate::model::ids::{QuestionId, ResultId};
use crate::model::session::QuizSession;

/// Immutable snapshot of a finished attempt, as stored in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: ResultId,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub date: DateTime<Utc>,
    /// Percentage of correct answers, 0-100.
    pub score: u8,
    pub total_questions: usize,
    pub answers: Vec<Answer>,
    /// Elapsed attempt time in milliseconds.
    pub time_taken: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_answers: Option<Vec<ReviewAnswer>>,
}

impl QuizResult {
    #[must_use]
    pub fn answer_for(&self, question_id: QuestionId) -> Option<&Answer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }

    #[must_use]
    pub fn review_for(&self, question_id: QuestionId) -> Option<&ReviewAnswer> {
        self.review_answers
            .as_deref()
            .and_then(|reviews| reviews.iter().find(|r| r.question_id == question_id))
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }
}

/// `round(100 * correct / total)`, with halves rounding up. Zero when `total` is zero.
#[must_use]
pub fn score_percent(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total);
    let rounded = (200 * correct + total) / (2 * total);
    u8::try_from(rounded).unwrap_or(100)
}

/// Derive the stored result for a session.
///
/// A pinned result always wins so that a result already annotated with
/// review data keeps its id. Otherwise a fresh result is derived once every
/// question has an answer; before that there is nothing to project.
#[must_use]
pub fn project_result(
    session: &QuizSession,
    pinned: Option<&QuizResult>,
    now: DateTime<Utc>,
) -> Option<QuizResult> {
    if let Some(pinned) = pinned {
        return Some(pinned.clone());
    }

    let set = session.question_set()?;
    if !session.is_completed() {
        return None;
    }

    let key = set.key();
    Some(QuizResult {
        id: ResultId::generate(now),
        category: key.category_name().to_owned(),
        subcategory: key.subcategory_name().map(str::to_owned),
        date: now,
        score: session.score(),
        total_questions: set.len(),
        answers: session.answers().to_vec(),
        time_taken: session.elapsed_ms(now),
        review_answers: None,
    })
}
