//! Service configuration and default artifact locations.

use std::path::{Path, PathBuf};

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_MODEL_DIR: &str = "models";
pub const CLASSIFIER_FILE: &str = "model_classifier.json";
pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const DEFAULT_STOPWORDS_DIR: &str = "stopwords";
pub const DEFAULT_LANGUAGE: &str = "indonesian";

/// Human-readable service name reported by the health check.
pub const SERVICE_MESSAGE: &str = "Forum Fisika AI API";

/// Locations of the fitted vectorizer and classifier artifacts.
///
/// Both files must come from the same training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub classifier: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            vectorizer: dir.join(VECTORIZER_FILE),
            classifier: dir.join(CLASSIFIER_FILE),
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::in_dir(Path::new(DEFAULT_MODEL_DIR))
    }
}

/// Where the stopword corpus comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopwordConfig {
    pub language: String,
    /// Corpus file, one word per line. Used as the download cache when `url` is set.
    pub path: PathBuf,
    /// Fetched once into `path` if the file does not exist yet.
    pub url: Option<String>,
}

impl StopwordConfig {
    pub fn for_language(language: &str) -> Self {
        Self {
            language: language.to_string(),
            path: Path::new(DEFAULT_STOPWORDS_DIR).join(language),
            url: None,
        }
    }
}

impl Default for StopwordConfig {
    fn default() -> Self {
        Self::for_language(DEFAULT_LANGUAGE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind: String,
    pub artifacts: ArtifactPaths,
    pub stopwords: StopwordConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            artifacts: ArtifactPaths::default(),
            stopwords: StopwordConfig::default(),
        }
    }
}
