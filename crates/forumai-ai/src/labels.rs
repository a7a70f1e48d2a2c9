//! Ordered category labels recovered from a fitted classifier.
//!
//! The order is the classifier's column order: index `i` of every
//! probability vector belongs to label `i`. Ties in argmax resolve to the
//! label declared first.

use std::collections::HashSet;

use forumai_core::ProbabilityMap;

use crate::error::ArtifactError;

/// Ordered sequence of distinct, non-empty labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    /// Validate and build a label set. Rejects an empty list, blank labels,
    /// and duplicates.
    pub fn new(labels: Vec<String>) -> Result<Self, ArtifactError> {
        if labels.is_empty() {
            return Err(ArtifactError::Invalid("classifier declares no classes".into()));
        }

        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if label.trim().is_empty() {
                return Err(ArtifactError::Invalid("blank class label".into()));
            }
            if !seen.insert(label.as_str()) {
                return Err(ArtifactError::Invalid(format!("duplicate class label {label:?}")));
            }
        }

        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Declaration index of `label`.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Pair each label with the probability at the same index.
    ///
    /// Callers guarantee `probabilities.len() == self.len()`.
    pub fn zip_probabilities(&self, probabilities: &[f64]) -> ProbabilityMap {
        ProbabilityMap::new(
            self.labels
                .iter()
                .cloned()
                .zip(probabilities.iter().copied())
                .collect(),
        )
    }
}
