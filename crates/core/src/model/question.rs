use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Reasons a question set document is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionSetError {
    #[error("question set has no questions")]
    Empty,

    #[error("question {id} has no options")]
    NoOptions { id: QuestionId },

    #[error("question {id} marks option {correct} as correct but has {options} options")]
    CorrectAnswerOutOfRange {
        id: QuestionId,
        correct: usize,
        options: usize,
    },

    #[error("question id {id} appears more than once")]
    DuplicateId { id: QuestionId },
}

//
// ─── KEY ──────────────────────────────────────────────────────────────────────
//

/// Identifies which content document to load: a category and an optional subcategory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuestionSetKey {
    category: String,
    subcategory: Option<String>,
}

impl QuestionSetKey {
    #[must_use]
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            subcategory: None,
        }
    }

    #[must_use]
    pub fn subcategory(category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        let subcategory = subcategory.into();
        Self {
            category: category.into(),
            subcategory: (!subcategory.is_empty()).then_some(subcategory),
        }
    }

    #[must_use]
    pub fn category_name(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn subcategory_name(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }

    /// The exact string the content cache stores this set under.
    #[must_use]
    pub fn cache_key(&self) -> String {
        match &self.subcategory {
            Some(sub) => format!("{}-{sub}", self.category),
            None => self.category.clone(),
        }
    }

    /// Path of the backing document relative to the content root.
    #[must_use]
    pub fn document_path(&self) -> String {
        format!("quizzes/{}.json", self.cache_key())
    }
}

impl fmt::Display for QuestionSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    #[must_use]
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: usize,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            options,
            correct_answer,
            explanation: explanation.into(),
        }
    }

    #[must_use]
    pub fn is_correct(&self, selected_option: usize) -> bool {
        selected_option == self.correct_answer
    }

    fn validate(&self) -> Result<(), QuestionSetError> {
        if self.options.is_empty() {
            return Err(QuestionSetError::NoOptions { id: self.id });
        }
        if self.correct_answer >= self.options.len() {
            return Err(QuestionSetError::CorrectAnswerOutOfRange {
                id: self.id,
                correct: self.correct_answer,
                options: self.options.len(),
            });
        }
        Ok(())
    }
}

//
// ─── DOCUMENT ─────────────────────────────────────────────────────────────────
//

/// Wire shape of a question set document as served by the content source.
///
/// `questions` stays optional here so a missing array is reported as a
/// validation failure rather than a parse failure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuizDocument {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub questions: Option<Vec<Question>>,
}

//
// ─── QUESTION SET ─────────────────────────────────────────────────────────────
//

/// Ordered, immutable collection of questions loaded for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    key: QuestionSetKey,
    questions: Vec<Question>,
}

impl QuestionSet {
    /// Build a set, checking every question's correct index and id uniqueness.
    ///
    /// An empty list is accepted here; callers that require content (the
    /// content cache, session start) reject it themselves.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError` if a question is malformed or ids repeat.
    pub fn new(key: QuestionSetKey, questions: Vec<Question>) -> Result<Self, QuestionSetError> {
        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            question.validate()?;
            if !seen.insert(question.id) {
                return Err(QuestionSetError::DuplicateId { id: question.id });
            }
        }
        Ok(Self { key, questions })
    }

    /// Validate a fetched document into a non-empty set.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::Empty` when `questions` is missing or empty,
    /// or any error from [`QuestionSet::new`].
    pub fn from_document(
        key: QuestionSetKey,
        document: QuizDocument,
    ) -> Result<Self, QuestionSetError> {
        let questions = document.questions.unwrap_or_default();
        if questions.is_empty() {
            return Err(QuestionSetError::Empty);
        }
        Self::new(key, questions)
    }

    #[must_use]
    pub fn key(&self) -> &QuestionSetKey {
        &self.key
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn find(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
