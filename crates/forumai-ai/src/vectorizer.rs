//! TF-IDF feature encoder for JSON-exported scikit-learn vectorizers.
//!
//! Reproduces `TfidfVectorizer.transform` for a fitted vocabulary: word
//! tokens of two or more word characters, optional word n-grams, raw or
//! sublinear term frequency, IDF weighting, and L1/L2 row normalization.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{ArtifactError, InferenceError};

/// Sparse feature vector of fixed dimensionality.
///
/// Entries are sorted by feature index with no duplicates; absent indices
/// are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// Build from unordered `(index, value)` pairs. Indices must be `< dim`
    /// and distinct.
    pub fn new(dim: usize, mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_by_key(|&(i, _)| i);
        debug_assert!(entries.iter().all(|&(i, _)| i < dim));
        Self { dim, entries }
    }

    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Non-zero entries, sorted by index.
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Dot product with a dense weight row of length `dim`.
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|&(i, v)| weights.get(i).copied().unwrap_or(0.0) * v)
            .sum()
    }

    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for &(i, v) in &self.entries {
            dense[i] = v;
        }
        dense
    }
}

/// Maps normalized text to a feature vector.
///
/// Implementations must be reentrant: `encode` takes `&self` and is called
/// concurrently from request handlers.
pub trait FeatureEncoder: Send + Sync {
    /// Output dimensionality.
    fn dim(&self) -> usize;

    /// Encode text. The empty string must be accepted.
    fn encode(&self, text: &str) -> Result<FeatureVector, InferenceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// On-disk vectorizer description.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorizerArtifact {
    pub vocabulary: HashMap<String, usize>,
    /// Absent when the vectorizer was fitted with `use_idf=False`.
    #[serde(default)]
    pub idf: Option<Vec<f64>>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default)]
    pub binary: bool,
    #[serde(default)]
    pub sublinear_tf: bool,
    /// `null` disables normalization; missing means L2.
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_true() -> bool {
    true
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// Fitted TF-IDF vectorizer.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Option<Vec<f64>>,
    ngram_range: (usize, usize),
    lowercase: bool,
    binary: bool,
    sublinear_tf: bool,
    norm: Option<Norm>,
    dim: usize,
}

impl TfidfVectorizer {
    /// Load a vectorizer artifact from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: VectorizerArtifact =
            serde_json::from_str(&raw).map_err(|source| ArtifactError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        let vectorizer = Self::from_artifact(artifact)?;
        info!(
            dim = vectorizer.dim,
            ngram_min = vectorizer.ngram_range.0,
            ngram_max = vectorizer.ngram_range.1,
            path = %path.display(),
            "loaded vectorizer"
        );
        Ok(vectorizer)
    }

    /// Validate an artifact: non-empty vocabulary with indices forming
    /// `0..dim`, IDF weights matching `dim`, and a sane n-gram range.
    pub fn from_artifact(artifact: VectorizerArtifact) -> Result<Self, ArtifactError> {
        let dim = artifact.vocabulary.len();
        if dim == 0 {
            return Err(ArtifactError::Invalid("vectorizer vocabulary is empty".into()));
        }

        let mut used = vec![false; dim];
        for (term, &idx) in &artifact.vocabulary {
            if idx >= dim {
                return Err(ArtifactError::Invalid(format!(
                    "vocabulary index {idx} for {term:?} out of range 0..{dim}"
                )));
            }
            if std::mem::replace(&mut used[idx], true) {
                return Err(ArtifactError::Invalid(format!(
                    "vocabulary index {idx} assigned twice"
                )));
            }
        }

        if let Some(idf) = &artifact.idf {
            if idf.len() != dim {
                return Err(ArtifactError::Invalid(format!(
                    "idf has {} weights for {dim} vocabulary terms",
                    idf.len()
                )));
            }
            if idf.iter().any(|w| !w.is_finite()) {
                return Err(ArtifactError::Invalid("idf contains non-finite weights".into()));
            }
        }

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ArtifactError::Invalid(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            ngram_range: artifact.ngram_range,
            lowercase: artifact.lowercase,
            binary: artifact.binary,
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
            dim,
        })
    }

    /// Raw term counts keyed by feature index.
    fn count_terms(&self, text: &str) -> HashMap<usize, f64> {
        let text = if self.lowercase {
            Cow::Owned(text.to_lowercase())
        } else {
            Cow::Borrowed(text)
        };
        let tokens = word_tokens(&text);

        let mut counts = HashMap::new();
        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                let term = window.join(" ");
                if let Some(&idx) = self.vocabulary.get(&term) {
                    *counts.entry(idx).or_insert(0.0) += 1.0;
                }
            }
        }
        counts
    }
}

impl FeatureEncoder for TfidfVectorizer {
    fn dim(&self) -> usize {
        self.dim
    }

    fn encode(&self, text: &str) -> Result<FeatureVector, InferenceError> {
        let weighted = self
            .count_terms(text)
            .into_iter()
            .map(|(idx, count)| {
                let tf = if self.binary {
                    1.0
                } else if self.sublinear_tf {
                    1.0 + count.ln()
                } else {
                    count
                };
                let weight = match &self.idf {
                    Some(idf) => tf * idf[idx],
                    None => tf,
                };
                (idx, weight)
            })
            .collect();

        // Sort before normalizing so the floating-point sum is order-stable.
        let mut vector = FeatureVector::new(self.dim, weighted);
        if let Some(norm) = self.norm {
            normalize(&mut vector.entries, norm);
        }
        Ok(vector)
    }
}

/// Word tokens: maximal runs of alphanumeric or `_` characters, at least
/// two characters long.
fn word_tokens(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().nth(1).is_some())
        .collect()
}

/// Scale entries to unit L1 or L2 norm in place. Zero vectors stay zero.
fn normalize(entries: &mut [(usize, f64)], norm: Norm) {
    let total: f64 = match norm {
        Norm::L1 => entries.iter().map(|(_, v)| v.abs()).sum(),
        Norm::L2 => entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
    };
    if total > 0.0 {
        for (_, v) in entries.iter_mut() {
            *v /= total;
        }
    }
}
