use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::repository::StorageError;

/// Source of raw content documents (question sets, the category index),
/// addressed by a path relative to the content root.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the document body at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when no such document exists and
    /// `StorageError::Connection` for any other transport failure.
    async fn fetch(&self, path: &str) -> Result<String, StorageError>;
}

/// Serves documents from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryContentSource {
    root: PathBuf,
}

impl DirectoryContentSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(StorageError::NotFound);
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ContentSource for DirectoryContentSource {
    async fn fetch(&self, path: &str) -> Result<String, StorageError> {
        let full = self.resolve(path)?;
        match tokio::fs::read_to_string(&full).await {
            Ok(body) => Ok(body),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(err) => Err(StorageError::Connection(format!(
                "{}: {err}",
                full.display()
            ))),
        }
    }
}

/// In-memory content source that counts fetches; used in tests and prototypes.
#[derive(Clone, Default)]
pub struct InMemoryContentSource {
    documents: Arc<Mutex<HashMap<String, String>>>,
    fetches: Arc<AtomicUsize>,
}

impl InMemoryContentSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the document served at `path`.
    pub fn insert(&self, path: impl Into<String>, body: impl Into<String>) {
        if let Ok(mut guard) = self.documents.lock() {
            guard.insert(path.into(), body.into());
        }
    }

    /// Number of `fetch` calls served so far, including failed ones.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for InMemoryContentSource {
    async fn fetch(&self, path: &str) -> Result<String, StorageError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(path).cloned().ok_or(StorageError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_source_counts_fetches() {
        let source = InMemoryContentSource::new();
        source.insert("quizzes/rust.json", "{}");

        assert_eq!(source.fetch("quizzes/rust.json").await.unwrap(), "{}");
        assert!(matches!(
            source.fetch("quizzes/go.json").await,
            Err(StorageError::NotFound)
        ));
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn directory_source_reads_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("quizzes")).unwrap();
        std::fs::write(dir.path().join("quizzes/rust.json"), r#"{"questions":[]}"#).unwrap();

        let source = DirectoryContentSource::new(dir.path());
        let body = source.fetch("quizzes/rust.json").await.unwrap();
        assert_eq!(body, r#"{"questions":[]}"#);

        assert!(matches!(
            source.fetch("quizzes/missing.json").await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn directory_source_refuses_to_leave_root() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectoryContentSource::new(dir.path().join("content"));
        assert!(matches!(
            source.fetch("../secret.json").await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            source.fetch("/etc/passwd").await,
            Err(StorageError::NotFound)
        ));
    }
}
