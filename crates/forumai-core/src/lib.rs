pub mod api;
pub mod config;
pub mod prediction;

pub use config::{ArtifactPaths, ServiceConfig, StopwordConfig};
pub use prediction::{BatchItem, PredictionResult, ProbabilityMap};
