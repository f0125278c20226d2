//! Persisted history of finished attempts.

use std::sync::Arc;

use quiz_core::model::{History, QuestionId, QuizResult, ResultId, ReviewAnswer};
use storage::repository::KeyValueStore;

use crate::error::LedgerError;

/// Store key the serialized history lives under.
pub const HISTORY_STORE_KEY: &str = "quizHistory";

/// History of quiz results backed by a key-value store.
///
/// Every mutation writes the full history back. When that write fails the
/// in-memory history is put back to what it was before the mutation.
pub struct HistoryLedger {
    store: Arc<dyn KeyValueStore>,
    history: History,
}

impl HistoryLedger {
    /// Load the stored history. Absent or unreadable JSON starts an empty history.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Storage` if the store itself cannot be read.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, LedgerError> {
        let history = match store.load(HISTORY_STORE_KEY).await? {
            None => History::new(),
            Some(raw) => match serde_json::from_str::<Vec<QuizResult>>(&raw) {
                Ok(results) => History::from_results(results),
                Err(err) => {
                    tracing::warn!(error = %err, "stored quiz history is corrupt; starting empty");
                    History::new()
                }
            },
        };
        tracing::debug!(results = history.len(), "quiz history loaded");
        Ok(Self { store, history })
    }

    /// Record a finished attempt at the front of the history.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if the updated history cannot be saved.
    pub async fn add(&mut self, result: QuizResult) -> Result<(), LedgerError> {
        let previous = self.history.clone();
        self.history.add(result);
        self.commit(previous).await
    }

    /// Append a review attempt to a stored result.
    ///
    /// Returns `Ok(None)` without writing when the result or the original
    /// answer does not exist.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if the updated history cannot be saved.
    pub async fn record_review(
        &mut self,
        result_id: &ResultId,
        question_id: QuestionId,
        selected_option: usize,
        correct_answer: usize,
    ) -> Result<Option<ReviewAnswer>, LedgerError> {
        let previous = self.history.clone();
        let review = self
            .history
            .record_review(result_id, question_id, selected_option, correct_answer)
            .cloned();

        let Some(review) = review else {
            tracing::debug!(%result_id, %question_id, "review ignored: no matching answer");
            return Ok(None);
        };

        self.commit(previous).await?;
        Ok(Some(review))
    }

    /// Remove every stored result.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if the empty history cannot be saved.
    pub async fn clear(&mut self) -> Result<(), LedgerError> {
        let previous = self.history.clone();
        self.history.clear();
        self.commit(previous).await
    }

    /// Write the current history to the store.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` on serialization or storage failure.
    pub async fn save(&self) -> Result<(), LedgerError> {
        let encoded = serde_json::to_string(self.history.as_slice())?;
        self.store.save(HISTORY_STORE_KEY, &encoded).await?;
        tracing::debug!(results = self.history.len(), "quiz history saved");
        Ok(())
    }

    #[must_use]
    pub fn results(&self) -> &[QuizResult] {
        self.history.as_slice()
    }

    #[must_use]
    pub fn by_id(&self, id: &ResultId) -> Option<&QuizResult> {
        self.history.by_id(id)
    }

    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<&QuizResult> {
        self.history.by_category(category)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    async fn commit(&mut self, previous: History) -> Result<(), LedgerError> {
        if let Err(err) = self.save().await {
            tracing::warn!(error = %err, "quiz history save failed; change rolled back");
            self.history = previous;
            return Err(err);
        }
        Ok(())
    }
}
