use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

const DEFAULT_BASE_URL: &str = "http://localhost:5173/";
const DEFAULT_DATABASE_URL: &str = "sqlite://quiz.db?mode=rwc";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Where question sets and the category index are read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentLocation {
    Http(Url),
    Directory(PathBuf),
}

#[derive(Clone, Debug)]
pub struct QuizConfig {
    pub content: ContentLocation,
    pub database_url: String,
    pub fetch_timeout: Duration,
}

impl QuizConfig {
    /// Read configuration from `QUIZ_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`QuizConfig::from_env`] with a custom variable source.
    ///
    /// `QUIZ_CONTENT_DIR` takes precedence over `QUIZ_CONTENT_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let content = match non_empty("QUIZ_CONTENT_DIR") {
            Some(dir) => ContentLocation::Directory(PathBuf::from(dir)),
            None => {
                let raw = non_empty("QUIZ_CONTENT_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.into());
                ContentLocation::Http(parse_base_url(&raw)?)
            }
        };

        let database_url =
            non_empty("QUIZ_DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());

        let fetch_timeout = match non_empty("QUIZ_FETCH_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Timeout(raw))?,
            None => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        };

        Ok(Self {
            content,
            database_url,
            fetch_timeout,
        })
    }
}

/// Parse a base URL so that relative document paths join beneath it.
///
/// # Errors
///
/// Returns `ConfigError::BaseUrl` if `raw` is not an absolute URL.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|source| ConfigError::BaseUrl {
        value: raw.to_owned(),
        source,
    })
}
