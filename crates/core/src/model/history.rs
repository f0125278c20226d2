use crate::model::answer::{Answer, ReviewAnswer};
use crate::model::ids::{QuestionId, ResultId};
use crate::model::result::QuizResult;

/// Maximum number of results kept in the history.
pub const HISTORY_CAPACITY: usize = 20;

/// Most-recent-first list of finished attempts, capped at [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    results: Vec<QuizResult>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted results, keeping only the newest entries past the cap.
    #[must_use]
    pub fn from_results(mut results: Vec<QuizResult>) -> Self {
        results.truncate(HISTORY_CAPACITY);
        Self { results }
    }

    /// Insert at the front, dropping the oldest entries beyond the cap.
    ///
    /// Ids are not deduplicated.
    pub fn add(&mut self, result: QuizResult) {
        self.results.insert(0, result);
        self.results.truncate(HISTORY_CAPACITY);
    }

    /// Append a review attempt for one question of a stored result.
    ///
    /// Returns `None` and leaves the history untouched when the result is
    /// unknown or the question was not answered in that attempt.
    pub fn record_review(
        &mut self,
        result_id: &ResultId,
        question_id: QuestionId,
        selected_option: usize,
        correct_answer: usize,
    ) -> Option<&ReviewAnswer> {
        let result = self.results.iter_mut().find(|r| &r.id == result_id)?;
        if result.review_for(question_id).is_none() {
            let original = *result.answer_for(question_id)?;
            result
                .review_answers
                .get_or_insert_with(Vec::new)
                .push(ReviewAnswer::new(original));
        }

        let entry = result
            .review_answers
            .as_mut()?
            .iter_mut()
            .find(|r| r.question_id == question_id)?;
        entry.push(Answer::against(question_id, selected_option, correct_answer));
        Some(&*entry)
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    #[must_use]
    pub fn by_id(&self, id: &ResultId) -> Option<&QuizResult> {
        self.results.iter().find(|r| &r.id == id)
    }

    /// All results for a category, most recent first.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<&QuizResult> {
        self.results
            .iter()
            .filter(|r| r.category == category)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuizResult> {
        self.results.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[QuizResult] {
        &self.results
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
