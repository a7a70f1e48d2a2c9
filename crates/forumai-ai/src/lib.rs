//! Inference layer: text normalization, TF-IDF features, and probabilistic
//! classifiers loaded from JSON-exported scikit-learn artifacts.

pub mod classifier;
mod error;
pub mod labels;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod stopwords;
pub mod vectorizer;

pub use classifier::{Classifier, ClassifierArtifact, load_classifier};
pub use error::{ArtifactError, ClassifyError, InferenceError, StopwordError};
pub use labels::LabelSet;
pub use model::{Model, ModelState, ModelStatus, ModelSummary, load_model};
pub use normalize::normalize;
pub use orchestrator::Orchestrator;
pub use stopwords::{StopwordSet, fetch_stopwords};
pub use vectorizer::{FeatureEncoder, FeatureVector, TfidfVectorizer};
