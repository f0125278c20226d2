//! Memoizing loader for question sets.

mod http;

pub use http::HttpContentSource;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quiz_core::model::{CategoryIndex, QuestionSet, QuestionSetKey, QuizCategory, QuizDocument};
use storage::content::ContentSource;

use crate::error::{ContentError, ContentFailure};

const CATEGORY_INDEX_PATH: &str = "categories.json";

/// Loads question sets from a [`ContentSource`] and keeps them for reuse.
///
/// Entries are stored under [`QuestionSetKey::cache_key`] and only after the
/// document validated. Failures are never cached or retried.
pub struct ContentCache {
    source: Arc<dyn ContentSource>,
    entries: Mutex<HashMap<String, Arc<QuestionSet>>>,
}

impl ContentCache {
    #[must_use]
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the question set for `key`, fetching it on first use.
    ///
    /// Repeat calls return the same `Arc` until the entry is evicted.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Unavailable` if the document cannot be fetched,
    /// parsed, or validated.
    pub async fn load(&self, key: &QuestionSetKey) -> Result<Arc<QuestionSet>, ContentError> {
        let cache_key = key.cache_key();
        let hit = self.entries().get(&cache_key).cloned();
        if let Some(set) = hit {
            tracing::debug!(key = %cache_key, "question set cache hit");
            return Ok(set);
        }

        tracing::debug!(key = %cache_key, "question set cache miss");
        let set = match self.fetch_set(key).await {
            Ok(set) => Arc::new(set),
            Err(cause) => {
                tracing::warn!(key = %cache_key, error = %cause, "question set unavailable");
                return Err(ContentError::Unavailable {
                    key: cache_key,
                    cause,
                });
            }
        };

        let mut entries = self.entries();
        let stored = entries.entry(cache_key).or_insert(set);
        Ok(Arc::clone(stored))
    }

    /// Whether `key` can be loaded. A successful check leaves the set cached.
    pub async fn exists(&self, key: &QuestionSetKey) -> bool {
        self.load(key).await.is_ok()
    }

    /// Drop one entry; returns whether it was cached.
    pub fn evict(&self, key: &QuestionSetKey) -> bool {
        self.entries().remove(&key.cache_key()).is_some()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    #[must_use]
    pub fn is_cached(&self, key: &QuestionSetKey) -> bool {
        self.entries().contains_key(&key.cache_key())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Read the category index. Any failure yields an empty list.
    pub async fn categories(&self) -> Vec<QuizCategory> {
        let parsed = match self.source.fetch(CATEGORY_INDEX_PATH).await {
            Ok(body) => serde_json::from_str::<CategoryIndex>(&body)
                .map_err(|err| err.to_string()),
            Err(err) => Err(err.to_string()),
        };

        match parsed {
            Ok(index) => index.categories,
            Err(error) => {
                tracing::warn!(%error, "category index unavailable");
                Vec::new()
            }
        }
    }

    async fn fetch_set(&self, key: &QuestionSetKey) -> Result<QuestionSet, ContentFailure> {
        let body = self
            .source
            .fetch(&key.document_path())
            .await
            .map_err(ContentFailure::Transport)?;
        let document: QuizDocument =
            serde_json::from_str(&body).map_err(ContentFailure::Malformed)?;
        QuestionSet::from_document(key.clone(), document).map_err(ContentFailure::Invalid)
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<QuestionSet>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::content::InMemoryContentSource;

    const RUST_BASICS: &str = r#"{
        "category": "rust",
        "subcategory": "basics",
        "questions": [
            { "id": 1, "question": "Q1", "options": ["a", "b"], "correctAnswer": 1, "explanation": "" },
            { "id": 2, "question": "Q2", "options": ["a", "b"], "correctAnswer": 0, "explanation": "" }
        ]
    }"#;

    fn cache_with(docs: &[(&str, &str)]) -> (ContentCache, InMemoryContentSource) {
        let source = InMemoryContentSource::new();
        for (path, body) in docs {
            source.insert(*path, *body);
        }
        (ContentCache::new(Arc::new(source.clone())), source)
    }

    #[tokio::test]
    async fn repeat_load_returns_same_instance_without_refetch() {
        let (cache, source) = cache_with(&[("quizzes/rust-basics.json", RUST_BASICS)]);
        let key = QuestionSetKey::subcategory("rust", "basics");

        let first = cache.load(&key).await.unwrap();
        let second = cache.load(&key).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.fetch_count(), 1);
        assert_eq!(first.len(), 2);
    }

    #[tokio::test]
    async fn evict_forces_a_fresh_fetch() {
        let (cache, source) = cache_with(&[("quizzes/rust-basics.json", RUST_BASICS)]);
        let key = QuestionSetKey::subcategory("rust", "basics");

        let first = cache.load(&key).await.unwrap();
        assert!(cache.evict(&key));
        assert!(!cache.evict(&key));
        let second = cache.load(&key).await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn category_and_subcategory_keys_are_distinct() {
        let (cache, _source) = cache_with(&[
            ("quizzes/rust-basics.json", RUST_BASICS),
            ("quizzes/rust.json", RUST_BASICS),
        ]);

        cache.load(&QuestionSetKey::category("rust")).await.unwrap();
        assert!(cache.is_cached(&QuestionSetKey::category("rust")));
        assert!(!cache.is_cached(&QuestionSetKey::subcategory("rust", "basics")));

        cache.load(&QuestionSetKey::subcategory("rust", "basics")).await.unwrap();
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn transport_and_validation_failures_share_one_kind() {
        let (cache, source) = cache_with(&[
            ("quizzes/empty.json", r#"{ "questions": [] }"#),
            ("quizzes/missing.json", r#"{ "category": "missing" }"#),
            ("quizzes/scalar.json", r#"{ "questions": "nope" }"#),
            ("quizzes/broken.json", "{"),
        ]);

        for name in ["empty", "missing", "scalar", "broken", "absent"] {
            let err = cache.load(&QuestionSetKey::category(name)).await.unwrap_err();
            let ContentError::Unavailable { key, .. } = err;
            assert_eq!(key, name);
        }

        assert!(cache.is_empty());
        let before = source.fetch_count();
        assert!(cache.load(&QuestionSetKey::category("empty")).await.is_err());
        assert_eq!(source.fetch_count(), before + 1);
    }

    #[tokio::test]
    async fn failure_causes_are_preserved() {
        let (cache, _source) = cache_with(&[("quizzes/empty.json", r#"{ "questions": [] }"#)]);

        let err = cache.load(&QuestionSetKey::category("empty")).await.unwrap_err();
        let ContentError::Unavailable { cause, .. } = err;
        assert!(matches!(cause, ContentFailure::Invalid(_)));

        let err = cache.load(&QuestionSetKey::category("absent")).await.unwrap_err();
        let ContentError::Unavailable { cause, .. } = err;
        assert!(matches!(cause, ContentFailure::Transport(_)));
    }

    #[tokio::test]
    async fn exists_reports_and_populates() {
        let (cache, source) = cache_with(&[("quizzes/rust-basics.json", RUST_BASICS)]);
        let key = QuestionSetKey::subcategory("rust", "basics");

        assert!(cache.exists(&key).await);
        assert!(cache.is_cached(&key));
        assert!(!cache.exists(&QuestionSetKey::category("go")).await);

        cache.load(&key).await.unwrap();
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn categories_fall_back_to_empty() {
        let (cache, source) = cache_with(&[]);
        assert!(cache.categories().await.is_empty());

        source.insert(
            "categories.json",
            r#"{ "categories": [
                { "id": "rust", "name": "Rust", "subcategories": [ { "id": "basics", "name": "Basics" } ] }
            ] }"#,
        );
        let categories = cache.categories().await;
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].subcategories[0].id, "basics");
    }
}
