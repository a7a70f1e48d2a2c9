//! Probabilistic classifiers over TF-IDF features.
//!
//! Artifacts are JSON exports of fitted scikit-learn estimators, selected
//! by a `kind` tag. Each classifier reports one probability per label in
//! [`LabelSet`] order.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{ArtifactError, InferenceError};
use crate::labels::LabelSet;
use crate::vectorizer::FeatureVector;

/// Maps a feature vector to a probability distribution over a fixed label set.
///
/// Implementations must be reentrant for read-only inference.
pub trait Classifier: Send + Sync {
    /// Labels in probability-vector order.
    fn labels(&self) -> &LabelSet;

    /// Expected feature dimensionality.
    fn n_features(&self) -> usize;

    /// Short name of the estimator family, for logs and `inspect`.
    fn kind(&self) -> &'static str;

    /// One probability per label, same order as [`Classifier::labels`].
    fn predict_proba(&self, x: &FeatureVector) -> Result<Vec<f64>, InferenceError>;
}

/// How a logistic regression turns decision values into probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    /// `ovr` for two classes, `multinomial` otherwise.
    #[default]
    Auto,
    Multinomial,
    Ovr,
}

/// On-disk classifier description.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression {
        classes: Vec<String>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
        #[serde(default)]
        multi_class: MultiClass,
    },
    MultinomialNb {
        classes: Vec<String>,
        class_log_prior: Vec<f64>,
        feature_log_prob: Vec<Vec<f64>>,
    },
}

impl ClassifierArtifact {
    /// Validate the artifact and build the matching classifier.
    pub fn build(self) -> Result<Box<dyn Classifier>, ArtifactError> {
        match self {
            Self::LogisticRegression {
                classes,
                coef,
                intercept,
                multi_class,
            } => Ok(Box::new(LogisticRegression::new(
                classes,
                coef,
                intercept,
                multi_class,
            )?)),
            Self::MultinomialNb {
                classes,
                class_log_prior,
                feature_log_prob,
            } => Ok(Box::new(MultinomialNb::new(
                classes,
                class_log_prior,
                feature_log_prob,
            )?)),
        }
    }
}

/// Load a classifier artifact from a JSON file.
pub fn load_classifier(path: &Path) -> Result<Box<dyn Classifier>, ArtifactError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let artifact: ClassifierArtifact =
        serde_json::from_str(&raw).map_err(|source| ArtifactError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    let classifier = artifact.build()?;
    info!(
        kind = classifier.kind(),
        classes = classifier.labels().len(),
        n_features = classifier.n_features(),
        path = %path.display(),
        "loaded classifier"
    );
    Ok(classifier)
}

// ── Logistic regression ──

/// Linear model with softmax (multinomial) or normalized sigmoid (OvR) output.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    labels: LabelSet,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    multi_class: MultiClass,
    n_features: usize,
}

impl LogisticRegression {
    /// Two classes are stored as a single coefficient row (the decision for
    /// the second class); more classes need one row per class.
    pub fn new(
        classes: Vec<String>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
        multi_class: MultiClass,
    ) -> Result<Self, ArtifactError> {
        let labels = LabelSet::new(classes)?;
        if labels.len() < 2 {
            return Err(ArtifactError::Invalid(
                "logistic regression needs at least two classes".into(),
            ));
        }
        let rows = if labels.len() == 2 { 1 } else { labels.len() };
        if coef.len() != rows || intercept.len() != rows {
            return Err(ArtifactError::Invalid(format!(
                "expected {rows} coefficient rows and intercepts for {} classes, got {} and {}",
                labels.len(),
                coef.len(),
                intercept.len()
            )));
        }
        let n_features = check_matrix("coef", &coef)?;
        check_finite("intercept", &intercept)?;

        Ok(Self {
            labels,
            coef,
            intercept,
            multi_class,
            n_features,
        })
    }

    fn decision(&self, x: &FeatureVector) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| x.dot(row) + b)
            .collect()
    }
}

impl Classifier for LogisticRegression {
    fn labels(&self) -> &LabelSet {
        &self.labels
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn predict_proba(&self, x: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        check_dim(self.n_features, x)?;
        let decision = self.decision(x);
        let binary = decision.len() == 1;

        let ovr = match self.multi_class {
            MultiClass::Ovr => true,
            MultiClass::Multinomial => false,
            MultiClass::Auto => binary,
        };

        let proba = match (ovr, binary) {
            (true, true) => {
                let p = sigmoid(decision[0]);
                vec![1.0 - p, p]
            }
            (true, false) => {
                let mut p: Vec<f64> = decision.into_iter().map(sigmoid).collect();
                let total: f64 = p.iter().sum();
                for v in &mut p {
                    *v /= total;
                }
                p
            }
            (false, true) => softmax(&[-decision[0], decision[0]]),
            (false, false) => softmax(&decision),
        };
        Ok(proba)
    }
}

// ── Multinomial naive Bayes ──

/// Multinomial naive Bayes: posterior from log priors and per-class feature
/// log probabilities.
#[derive(Debug, Clone)]
pub struct MultinomialNb {
    labels: LabelSet,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
    n_features: usize,
}

impl MultinomialNb {
    pub fn new(
        classes: Vec<String>,
        class_log_prior: Vec<f64>,
        feature_log_prob: Vec<Vec<f64>>,
    ) -> Result<Self, ArtifactError> {
        let labels = LabelSet::new(classes)?;
        if class_log_prior.len() != labels.len() || feature_log_prob.len() != labels.len() {
            return Err(ArtifactError::Invalid(format!(
                "expected {} priors and feature rows, got {} and {}",
                labels.len(),
                class_log_prior.len(),
                feature_log_prob.len()
            )));
        }
        let n_features = check_matrix("feature_log_prob", &feature_log_prob)?;
        check_finite("class_log_prior", &class_log_prior)?;

        Ok(Self {
            labels,
            class_log_prior,
            feature_log_prob,
            n_features,
        })
    }
}

impl Classifier for MultinomialNb {
    fn labels(&self) -> &LabelSet {
        &self.labels
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn kind(&self) -> &'static str {
        "multinomial_nb"
    }

    fn predict_proba(&self, x: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        check_dim(self.n_features, x)?;
        let jll: Vec<f64> = self
            .feature_log_prob
            .iter()
            .zip(&self.class_log_prior)
            .map(|(row, prior)| x.dot(row) + prior)
            .collect();
        Ok(softmax(&jll))
    }
}

// ── Helpers ──

fn check_dim(expected: usize, x: &FeatureVector) -> Result<(), InferenceError> {
    if x.dim() != expected {
        return Err(InferenceError::DimensionMismatch {
            expected,
            actual: x.dim(),
        });
    }
    Ok(())
}

/// Rectangular, non-empty, finite. Returns the row width.
fn check_matrix(name: &str, rows: &[Vec<f64>]) -> Result<usize, ArtifactError> {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    if width == 0 {
        return Err(ArtifactError::Invalid(format!("{name} has no features")));
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(ArtifactError::Invalid(format!(
                "{name} row {i} has {} values, expected {width}",
                row.len()
            )));
        }
        check_finite(name, row)?;
    }
    Ok(width)
}

fn check_finite(name: &str, values: &[f64]) -> Result<(), ArtifactError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ArtifactError::Invalid(format!("{name} contains non-finite values")));
    }
    Ok(())
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Numerically stable softmax.
fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
