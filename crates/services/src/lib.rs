#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod content;
pub mod error;
pub mod history;
pub mod quiz_service;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use config::{ContentLocation, QuizConfig};
pub use content::{ContentCache, HttpContentSource};
pub use error::{
    AppServicesError, ConfigError, ContentError, ContentFailure, LedgerError, QuizServiceError,
};
pub use history::{HISTORY_STORE_KEY, HistoryLedger};
pub use quiz_service::QuizService;
