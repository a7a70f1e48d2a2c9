//! Loaded model state: the paired feature encoder and classifier.
//!
//! Loading happens once at startup. The result is either `Ready` or
//! `Failed`; both are permanent for the life of the process.

use std::fmt;
use std::sync::Arc;

use forumai_core::ArtifactPaths;
use tracing::{error, info};

use crate::classifier::{Classifier, load_classifier};
use crate::error::ArtifactError;
use crate::labels::LabelSet;
use crate::vectorizer::{FeatureEncoder, TfidfVectorizer};

/// Lifecycle of the process-wide model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    Uninitialized,
    Loading,
    Ready,
    LoadFailed,
}

impl ModelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::LoadFailed => "load_failed",
        }
    }
}

/// A feature encoder and the classifier trained on its output.
pub struct Model {
    encoder: Box<dyn FeatureEncoder>,
    classifier: Box<dyn Classifier>,
}

/// Printable description of a loaded model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub classifier_kind: &'static str,
    pub dim: usize,
    pub labels: Vec<String>,
}

impl Model {
    /// Pair an encoder with a classifier. Fails if their feature spaces differ.
    pub fn new(
        encoder: Box<dyn FeatureEncoder>,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self, ArtifactError> {
        if encoder.dim() != classifier.n_features() {
            return Err(ArtifactError::Incompatible {
                vectorizer_dim: encoder.dim(),
                classifier_dim: classifier.n_features(),
            });
        }
        Ok(Self {
            encoder,
            classifier,
        })
    }

    /// Load both artifacts from disk.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let encoder = TfidfVectorizer::load(&paths.vectorizer)?;
        let classifier = load_classifier(&paths.classifier)?;
        Self::new(Box::new(encoder), classifier)
    }

    pub fn encoder(&self) -> &dyn FeatureEncoder {
        self.encoder.as_ref()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn labels(&self) -> &LabelSet {
        self.classifier.labels()
    }

    pub fn dim(&self) -> usize {
        self.encoder.dim()
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            classifier_kind: self.classifier.kind(),
            dim: self.dim(),
            labels: self.labels().iter().map(str::to_string).collect(),
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("classifier", &self.classifier.kind())
            .field("dim", &self.dim())
            .field("labels", self.labels())
            .finish()
    }
}

/// Outcome of the startup load.
#[derive(Debug, Clone)]
pub enum ModelState {
    Ready(Arc<Model>),
    Failed { cause: String },
}

impl ModelState {
    pub fn ready(model: Model) -> Self {
        Self::Ready(Arc::new(model))
    }

    pub fn failed(cause: impl Into<String>) -> Self {
        Self::Failed {
            cause: cause.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn model(&self) -> Option<&Arc<Model>> {
        match self {
            Self::Ready(model) => Some(model),
            Self::Failed { .. } => None,
        }
    }

    /// Load failure cause, if any.
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Failed { cause } => Some(cause),
        }
    }

    pub fn status(&self) -> ModelStatus {
        match self {
            Self::Ready(_) => ModelStatus::Ready,
            Self::Failed { .. } => ModelStatus::LoadFailed,
        }
    }
}

/// Load the model artifacts. Never fails: errors become
/// [`ModelState::Failed`] and are logged.
pub fn load_model(paths: &ArtifactPaths) -> ModelState {
    info!(
        from = ModelStatus::Uninitialized.as_str(),
        to = ModelStatus::Loading.as_str(),
        vectorizer = %paths.vectorizer.display(),
        classifier = %paths.classifier.display(),
        "loading model"
    );

    let state = match Model::load(paths) {
        Ok(model) => {
            info!(
                kind = model.classifier().kind(),
                dim = model.dim(),
                labels = model.labels().len(),
                "model loaded"
            );
            ModelState::ready(model)
        }
        Err(e) => {
            error!(error = %e, "model failed to load; classify requests will be refused");
            ModelState::failed(e.to_string())
        }
    };
    info!(status = state.status().as_str(), "model lifecycle settled");
    state
}
