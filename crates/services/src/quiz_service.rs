use std::fmt;
use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{
    Advance, Answer, Question, QuestionId, QuestionSetKey, QuizResult, QuizSession, ResultId,
    ReviewAnswer,
};

use crate::content::ContentCache;
use crate::error::QuizServiceError;
use crate::history::HistoryLedger;

/// Runs quiz attempts: loads content, drives sessions, and records results.
pub struct QuizService {
    clock: Clock,
    content: Arc<ContentCache>,
    ledger: HistoryLedger,
}

impl QuizService {
    #[must_use]
    pub fn new(clock: Clock, content: Arc<ContentCache>, ledger: HistoryLedger) -> Self {
        Self {
            clock,
            content,
            ledger,
        }
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Load the question set for `key` and start a fresh session on it.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Content` if the set cannot be loaded and
    /// `QuizServiceError::Session` if it cannot be started.
    pub async fn start_quiz(&self, key: &QuestionSetKey) -> Result<QuizSession, QuizServiceError> {
        let questions = self.content.load(key).await?;
        let total = questions.len();
        let mut session = QuizSession::new();
        session.start(questions, self.clock.now())?;
        tracing::info!(%key, total, "quiz started");
        Ok(session)
    }

    /// Record a selection for the session's current question.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError` from the session.
    pub fn answer(
        &self,
        session: &mut QuizSession,
        selected_option: usize,
    ) -> Result<Answer, QuizServiceError> {
        Ok(session.answer(selected_option)?)
    }

    /// Move to the next question, completing the session after the last one.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError` from the session.
    pub fn advance(&self, session: &mut QuizSession) -> Result<Advance, QuizServiceError> {
        Ok(session.advance(self.clock.now())?)
    }

    /// The session's result as it would be recorded now, if it has one.
    #[must_use]
    pub fn current_result(&self, session: &QuizSession) -> Option<QuizResult> {
        session.result(self.clock.now())
    }

    /// Fix the session's result and add it to the history.
    ///
    /// The first call records the result; later calls return the pinned
    /// result without adding it again.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Incomplete` while questions are unanswered,
    /// or `QuizServiceError::Ledger` if the history cannot be saved.
    pub async fn finish(
        &mut self,
        session: &mut QuizSession,
    ) -> Result<QuizResult, QuizServiceError> {
        if let Some(pinned) = session.result_slot().pinned() {
            return Ok(pinned.clone());
        }

        let result = session
            .result(self.clock.now())
            .ok_or(QuizServiceError::Incomplete)?;
        self.ledger.add(result.clone()).await?;
        session.pin_result(result.clone());

        tracing::info!(
            id = %result.id,
            category = %result.category,
            score = result.score,
            time_taken_ms = result.time_taken,
            "quiz finished"
        );
        Ok(result)
    }

    /// Review one question of the session's recorded result.
    ///
    /// The correct index comes from the session's question set, and the
    /// session's pinned result is refreshed with the updated review data.
    /// Returns `Ok(None)` when the session has no recorded result or the
    /// question is not part of it.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Ledger` if the history cannot be saved.
    pub async fn record_review(
        &mut self,
        session: &mut QuizSession,
        question_id: QuestionId,
        selected_option: usize,
    ) -> Result<Option<ReviewAnswer>, QuizServiceError> {
        let Some(result_id) = session.result_slot().pinned().map(|r| r.id.clone()) else {
            return Ok(None);
        };
        let Some(question) = session.question_set().and_then(|set| set.find(question_id)) else {
            return Ok(None);
        };
        let correct_answer = question.correct_answer;

        let review = self
            .ledger
            .record_review(&result_id, question_id, selected_option, correct_answer)
            .await?;

        if review.is_some() {
            if let Some(updated) = self.ledger.by_id(&result_id) {
                session.pin_result(updated.clone());
            }
        }
        Ok(review)
    }

    /// Review a question of any stored result.
    ///
    /// A live session whose pinned result is `result_id` is re-pinned with
    /// the updated result.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Ledger` if the history cannot be saved.
    pub async fn review_result(
        &mut self,
        result_id: &ResultId,
        question: &Question,
        selected_option: usize,
        session: Option<&mut QuizSession>,
    ) -> Result<Option<ReviewAnswer>, QuizServiceError> {
        let review = self
            .ledger
            .record_review(result_id, question.id, selected_option, question.correct_answer)
            .await?;

        if review.is_some() {
            let holder = session.filter(|s| {
                s.result_slot()
                    .pinned()
                    .is_some_and(|pinned| &pinned.id == result_id)
            });
            if let (Some(session), Some(updated)) = (holder, self.ledger.by_id(result_id)) {
                session.pin_result(updated.clone());
            }
        }
        Ok(review)
    }

    /// Remove all recorded results.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Ledger` if the history cannot be saved.
    pub async fn clear_history(&mut self) -> Result<(), QuizServiceError> {
        Ok(self.ledger.clear().await?)
    }

    #[must_use]
    pub fn history(&self) -> &HistoryLedger {
        &self.ledger
    }
}

impl fmt::Debug for QuizService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizService")
            .field("clock", &self.clock)
            .field("cached_sets", &self.content.len())
            .field("history_len", &self.ledger.len())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::SessionState;
    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::content::InMemoryContentSource;
    use storage::repository::InMemoryRepository;

    const TWO_QUESTIONS: &str = r#"{
        "questions": [
            { "id": 1, "question": "Q1", "options": ["a", "b"], "correctAnswer": 1, "explanation": "" },
            { "id": 2, "question": "Q2", "options": ["a", "b"], "correctAnswer": 0, "explanation": "" }
        ]
    }"#;

    async fn build_service(clock: Clock) -> QuizService {
        let source = InMemoryContentSource::new();
        source.insert("quizzes/rust-basics.json", TWO_QUESTIONS);
        source.insert("quizzes/empty.json", r#"{ "questions": [] }"#);
        let content = Arc::new(ContentCache::new(Arc::new(source)));
        let ledger = HistoryLedger::load(Arc::new(InMemoryRepository::new()))
            .await
            .unwrap();
        QuizService::new(clock, content, ledger)
    }

    fn key() -> QuestionSetKey {
        QuestionSetKey::subcategory("rust", "basics")
    }

    #[tokio::test]
    async fn unavailable_content_surfaces_as_content_error() {
        let service = build_service(fixed_clock()).await;
        let err = service
            .start_quiz(&QuestionSetKey::category("empty"))
            .await
            .unwrap_err();
        assert!(matches!(err, QuizServiceError::Content(_)));
    }

    #[tokio::test]
    async fn finish_requires_every_answer() {
        let mut service = build_service(fixed_clock()).await;
        let mut session = service.start_quiz(&key()).await.unwrap();
        service.answer(&mut session, 1).unwrap();

        let err = service.finish(&mut session).await.unwrap_err();
        assert!(matches!(err, QuizServiceError::Incomplete));
        assert!(service.history().is_empty());
    }

    #[tokio::test]
    async fn finish_records_once_and_pins() {
        let mut service = build_service(fixed_clock()).await;
        let mut session = service.start_quiz(&key()).await.unwrap();

        service.answer(&mut session, 1).unwrap();
        assert_eq!(service.advance(&mut session).unwrap(), Advance::Continue);
        service.answer(&mut session, 1).unwrap();
        assert_eq!(service.advance(&mut session).unwrap(), Advance::Completed);
        assert_eq!(session.state(), SessionState::Completed);

        let first = service.finish(&mut session).await.unwrap();
        let again = service.finish(&mut session).await.unwrap();

        assert_eq!(first, again);
        assert_eq!(first.score, 50);
        assert_eq!(first.date, fixed_now());
        assert_eq!(service.history().len(), 1);
        assert_eq!(service.current_result(&session), Some(first));
    }

    #[tokio::test]
    async fn review_updates_ledger_and_pinned_result() {
        let mut service = build_service(fixed_clock()).await;
        let mut session = service.start_quiz(&key()).await.unwrap();
        service.answer(&mut session, 1).unwrap();
        service.advance(&mut session).unwrap();
        service.answer(&mut session, 1).unwrap();
        service.advance(&mut session).unwrap();

        assert!(
            service
                .record_review(&mut session, QuestionId::new(2), 0)
                .await
                .unwrap()
                .is_none(),
            "no result recorded yet"
        );

        let result = service.finish(&mut session).await.unwrap();
        let review = service
            .record_review(&mut session, QuestionId::new(2), 0)
            .await
            .unwrap()
            .unwrap();
        assert!(review.best_score);

        let pinned = session.result_slot().pinned().unwrap();
        assert_eq!(pinned.id, result.id);
        assert!(pinned.review_for(QuestionId::new(2)).unwrap().best_score);
        assert_eq!(service.history().by_id(&result.id), Some(pinned));

        assert!(
            service
                .record_review(&mut session, QuestionId::new(9), 0)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn elapsed_time_follows_the_clock() {
        let mut clock = fixed_clock();
        let service = build_service(clock).await;
        let mut session = service.start_quiz(&key()).await.unwrap();

        clock.advance(chrono::Duration::seconds(30));
        let later = service.with_clock(clock);
        later.answer(&mut session, 0).unwrap();
        later.advance(&mut session).unwrap();
        later.answer(&mut session, 0).unwrap();

        let provisional = later.current_result(&session).unwrap();
        assert_eq!(provisional.time_taken, 30_000);
        assert_eq!(provisional.score, 50);
    }

    #[tokio::test]
    async fn reviewing_a_stored_result_refreshes_the_session_holding_it() {
        let mut service = build_service(fixed_clock()).await;
        let mut session = service.start_quiz(&key()).await.unwrap();
        service.answer(&mut session, 0).unwrap();
        service.advance(&mut session).unwrap();
        service.answer(&mut session, 0).unwrap();
        service.advance(&mut session).unwrap();
        let result = service.finish(&mut session).await.unwrap();

        let missed = session.question_set().unwrap().find(QuestionId::new(1)).unwrap().clone();
        let review = service
            .review_result(&result.id, &missed, 1, Some(&mut session))
            .await
            .unwrap()
            .unwrap();
        assert!(review.best_score);
        assert_eq!(review.review_answers.len(), 1);

        let pinned = service.finish(&mut session).await.unwrap();
        assert!(pinned.review_for(QuestionId::new(1)).unwrap().best_score);
        assert_eq!(service.current_result(&session), Some(pinned.clone()));
        assert_eq!(service.history().by_id(&result.id), Some(&pinned));
        assert_eq!(service.history().len(), 1);
    }

    #[tokio::test]
    async fn reviewing_a_stored_result_leaves_other_sessions_alone() {
        let mut service = build_service(fixed_clock()).await;
        let mut first = service.start_quiz(&key()).await.unwrap();
        service.answer(&mut first, 0).unwrap();
        service.advance(&mut first).unwrap();
        service.answer(&mut first, 0).unwrap();
        let recorded = service.finish(&mut first).await.unwrap();

        let mut second = service.start_quiz(&key()).await.unwrap();
        service.answer(&mut second, 1).unwrap();
        service.advance(&mut second).unwrap();
        service.answer(&mut second, 0).unwrap();
        let other = service.finish(&mut second).await.unwrap();

        let missed = first.question_set().unwrap().find(QuestionId::new(1)).unwrap().clone();
        let review = service
            .review_result(&recorded.id, &missed, 1, Some(&mut second))
            .await
            .unwrap();
        assert!(review.is_some());
        assert_eq!(second.result_slot().pinned(), Some(&other));
        assert!(first.result_slot().pinned().unwrap().review_answers.is_none());
        assert!(
            service
                .history()
                .by_id(&recorded.id)
                .unwrap()
                .review_for(QuestionId::new(1))
                .is_some()
        );
    }

    #[tokio::test]
    async fn finishing_before_advance_times_against_the_clock() {
        let mut clock = fixed_clock();
        let service = build_service(clock).await;
        let mut session = service.start_quiz(&key()).await.unwrap();
        service.answer(&mut session, 1).unwrap();
        service.advance(&mut session).unwrap();
        service.answer(&mut session, 0).unwrap();

        clock.advance(chrono::Duration::seconds(12));
        let mut service = service.with_clock(clock);
        let result = service.finish(&mut session).await.unwrap();

        assert_eq!(session.state(), SessionState::InProgress);
        assert!(session.completed_at().is_none());
        assert_eq!(result.time_taken, 12_000);
        assert_eq!(result.score, 100);
        assert_eq!(service.history().len(), 1);
    }
}
