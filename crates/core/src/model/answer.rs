use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;
use crate::model::question::Question;

/// A recorded selection for one question.
///
/// `is_correct` is always derived from the selection; use [`Answer::grade`]
/// or [`Answer::against`] instead of building the struct by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: QuestionId,
    pub selected_option: usize,
    pub is_correct: bool,
}

impl Answer {
    /// Grade a selection against the question it answers.
    #[must_use]
    pub fn grade(question: &Question, selected_option: usize) -> Self {
        Self::against(question.id, selected_option, question.correct_answer)
    }

    /// Grade a selection against a known correct index.
    #[must_use]
    pub fn against(question_id: QuestionId, selected_option: usize, correct_answer: usize) -> Self {
        Self {
            question_id,
            selected_option,
            is_correct: selected_option == correct_answer,
        }
    }
}

/// Review history for one question of a stored result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAnswer {
    pub question_id: QuestionId,
    pub original_answer: Answer,
    pub review_answers: Vec<Answer>,
    /// Set once a review corrected an originally wrong answer; never cleared.
    pub best_score: bool,
}

impl ReviewAnswer {
    #[must_use]
    pub fn new(original_answer: Answer) -> Self {
        Self {
            question_id: original_answer.question_id,
            original_answer,
            review_answers: Vec::new(),
            best_score: false,
        }
    }

    pub(crate) fn push(&mut self, review: Answer) {
        if review.is_correct && !self.original_answer.is_correct {
            self.best_score = true;
        }
        self.review_answers.push(review);
    }

    /// The most recent review attempt, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&Answer> {
        self.review_answers.last()
    }
}
