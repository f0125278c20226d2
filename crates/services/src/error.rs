//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuestionSetError, SessionError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Why a question set could not be produced.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentFailure {
    #[error("fetch failed: {0}")]
    Transport(#[source] StorageError),
    #[error("document is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("document failed validation: {0}")]
    Invalid(#[source] QuestionSetError),
}

/// Errors emitted by `ContentCache`.
///
/// Transport and validation problems share one kind; the cause is kept for logs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("content unavailable for '{key}'")]
    Unavailable {
        key: String,
        #[source]
        cause: ContentFailure,
    },
}

/// Errors emitted by `HistoryLedger`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LedgerError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("history could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("quiz is not finished yet")]
    Incomplete,
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid content base url '{value}': {source}")]
    BaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid fetch timeout '{0}': expected whole seconds")]
    Timeout(String),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
