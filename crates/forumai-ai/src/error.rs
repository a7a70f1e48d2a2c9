use std::path::PathBuf;

use thiserror::Error;

/// Failure of a classify operation, as seen by the transport layer.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Model not loaded: {0}")]
    ModelUnavailable(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("inference failed: {0}")]
    InferenceFailure(#[from] InferenceError),
}

/// Failure inside the encode/classify stages.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("malformed probability distribution: {0}")]
    MalformedDistribution(String),

    #[error("inference task aborted: {0}")]
    Aborted(String),
}

/// Failure to load or validate a model artifact.
///
/// Never escapes [`crate::load_model`]; it is folded into
/// [`crate::ModelState::Failed`].
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid artifact: {0}")]
    Invalid(String),

    #[error("vectorizer produces {vectorizer_dim} features but classifier expects {classifier_dim}")]
    Incompatible {
        vectorizer_dim: usize,
        classifier_dim: usize,
    },
}

/// Failure to obtain the stopword corpus. Fatal at boot.
#[derive(Debug, Error)]
pub enum StopwordError {
    #[error("cannot read stopword corpus {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("stopword download failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("stopword server returned {status}")]
    Server { status: u16 },

    #[error("stopword corpus {0} contains no words")]
    Empty(PathBuf),
}
