//! Stopword corpus for a single language.
//!
//! The corpus file uses the NLTK layout: one word per line. It is loaded
//! once at startup and shared read-only by every request.

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::error::StopwordError;

/// Immutable set of stopwords for one language.
#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    language: String,
    words: HashSet<String>,
}

impl StopwordSet {
    /// Build from an explicit word list. Words are trimmed and lowercased.
    pub fn from_words<I, S>(language: &str, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            language: language.to_string(),
            words,
        }
    }

    /// Parse corpus text: one word per line, blank lines and `#` comments skipped.
    pub fn parse(language: &str, corpus: &str) -> Self {
        Self::from_words(
            language,
            corpus
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Load a corpus file from disk.
    pub fn load(language: &str, path: &Path) -> Result<Self, StopwordError> {
        let corpus = std::fs::read_to_string(path).map_err(|source| StopwordError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::parse(language, &corpus);
        if set.is_empty() {
            return Err(StopwordError::Empty(path.to_path_buf()));
        }
        info!(language, words = set.len(), path = %path.display(), "loaded stopwords");
        Ok(set)
    }

    /// Whether `word` is a stopword. The lookup is case-sensitive; callers
    /// pass already-lowercased tokens.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Load the corpus from `cache_path`, downloading it from `url` first if
/// the file does not exist yet.
pub async fn fetch_stopwords(
    language: &str,
    url: &str,
    cache_path: &Path,
) -> Result<StopwordSet, StopwordError> {
    if !cache_path.exists() {
        info!(url, path = %cache_path.display(), "downloading stopword corpus");
        let resp = reqwest::get(url).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StopwordError::Server {
                status: status.as_u16(),
            });
        }
        let body = resp.text().await?;

        let io_err = |source| StopwordError::Io {
            path: cache_path.to_path_buf(),
            source,
        };
        if let Some(parent) = cache_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(cache_path, body).await.map_err(io_err)?;
    }

    StopwordSet::load(language, cache_path)
}
