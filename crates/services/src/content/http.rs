use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use storage::content::ContentSource;
use storage::repository::StorageError;
use tracing::instrument;
use url::Url;

/// Fetches content documents over HTTP relative to a base URL.
#[derive(Clone, Debug)]
pub struct HttpContentSource {
    client: Client,
    base_url: Url,
}

impl HttpContentSource {
    /// Build a source with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    #[instrument(skip(self))]
    async fn fetch(&self, path: &str) -> Result<String, StorageError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound);
        }
        if !status.is_success() {
            return Err(StorageError::Connection(format!(
                "unexpected status {status}"
            )));
        }

        response
            .text()
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))
    }
}
