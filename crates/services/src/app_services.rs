use std::sync::Arc;

use storage::content::{ContentSource, DirectoryContentSource};
use storage::repository::Storage;

use crate::Clock;
use crate::config::{ContentLocation, QuizConfig};
use crate::content::{ContentCache, HttpContentSource};
use crate::error::AppServicesError;
use crate::history::HistoryLedger;
use crate::quiz_service::QuizService;

/// Assembles the content cache and quiz service from configuration.
pub struct AppServices {
    content: Arc<ContentCache>,
    quiz: QuizService,
}

impl AppServices {
    /// Build services from `QUIZ_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Config` for unusable variables, or any error
    /// from [`AppServices::from_config`].
    pub async fn from_env(clock: Clock) -> Result<Self, AppServicesError> {
        let config = QuizConfig::from_env()?;
        Self::from_config(&config, clock).await
    }

    /// Build services backed by `SQLite` storage and the configured content location.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the HTTP client, storage, or history
    /// cannot be initialized.
    pub async fn from_config(config: &QuizConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let source: Arc<dyn ContentSource> = match &config.content {
            ContentLocation::Http(base_url) => Arc::new(HttpContentSource::new(
                base_url.clone(),
                config.fetch_timeout,
            )?),
            ContentLocation::Directory(root) => Arc::new(DirectoryContentSource::new(root.clone())),
        };
        let storage = Storage::sqlite(&config.database_url).await?;
        Self::with_storage(clock, source, storage).await
    }

    /// Build services over an already constructed storage backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Ledger` if the stored history cannot be read.
    pub async fn with_storage(
        clock: Clock,
        source: Arc<dyn ContentSource>,
        storage: Storage,
    ) -> Result<Self, AppServicesError> {
        let content = Arc::new(ContentCache::new(source));
        let ledger = HistoryLedger::load(Arc::clone(&storage.kv)).await?;
        let quiz = QuizService::new(clock, Arc::clone(&content), ledger);
        Ok(Self { content, quiz })
    }

    #[must_use]
    pub fn content(&self) -> Arc<ContentCache> {
        Arc::clone(&self.content)
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizService {
        &self.quiz
    }

    pub fn quiz_mut(&mut self) -> &mut QuizService {
        &mut self.quiz
    }
}
