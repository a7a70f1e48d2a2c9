//! Request and response bodies of the HTTP classification API.
//!
//! Shared by `forumai-server` and `forumai-client` so both ends agree on
//! field names.

use serde::{Deserialize, Serialize};

use crate::prediction::{BatchItem, PredictionResult, ProbabilityMap};

/// Body of `POST /classify`.
///
/// A missing or `null` `text` is treated as the empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub text: Option<String>,
}

impl ClassifyRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// Body of `POST /classify/batch`.
///
/// A missing or `null` `texts` is treated as an empty list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub texts: Option<Vec<String>>,
}

impl BatchRequest {
    pub fn new(texts: Vec<String>) -> Self {
        Self { texts: Some(texts) }
    }

    pub fn texts(&self) -> &[String] {
        self.texts.as_deref().unwrap_or_default()
    }

    pub fn into_texts(self) -> Vec<String> {
        self.texts.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub success: bool,
    /// The caller's text, echoed unchanged.
    pub text: String,
    pub prediction: String,
    pub confidence: f64,
    pub probabilities: ProbabilityMap,
}

impl ClassifyResponse {
    pub fn from_result(text: String, result: PredictionResult) -> Self {
        Self {
            success: true,
            text,
            prediction: result.label,
            confidence: result.confidence,
            probabilities: result.probabilities,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemResponse {
    pub text: String,
    pub prediction: String,
    pub confidence: f64,
}

impl From<BatchItem> for BatchItemResponse {
    fn from(item: BatchItem) -> Self {
        Self {
            text: item.text,
            prediction: item.label,
            confidence: item.confidence,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success: bool,
    pub count: usize,
    /// One entry per input text, in input order.
    pub results: Vec<BatchItemResponse>,
}

impl BatchResponse {
    pub fn from_items(items: Vec<BatchItem>) -> Self {
        let results: Vec<BatchItemResponse> = items.into_iter().map(Into::into).collect();
        Self {
            success: true,
            count: results.len(),
            results,
        }
    }
}

/// Body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Body of `GET /` and `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub model_loaded: bool,
    #[serde(default)]
    pub version: String,
}
