//! HTTP client for a running forumai service.

use forumai_core::api::{
    BatchItemResponse, BatchRequest, BatchResponse, ClassifyRequest, ClassifyResponse,
    ErrorResponse, HealthResponse,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {error}")]
    Server { status: u16, error: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client for the `/health`, `/classify` and `/classify/batch` endpoints.
pub struct ClassifierClient {
    client: reqwest::Client,
    base_url: String,
}

impl ClassifierClient {
    /// Create a client for the service at `base_url`, e.g. `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/health", self.base_url);
        debug!(url = %url, "checking service health");
        let resp = self.client.get(&url).send().await?;
        read(resp).await
    }

    /// Classify one text. The response carries the full probability map.
    pub async fn classify(&self, text: &str) -> Result<ClassifyResponse, ClientError> {
        let url = format!("{}/classify", self.base_url);
        info!(url = %url, "classifying text");
        let resp = self
            .client
            .post(&url)
            .json(&ClassifyRequest::new(text))
            .send()
            .await?;
        read(resp).await
    }

    /// Classify several texts in one request. Results come back in input order.
    pub async fn classify_batch(
        &self,
        texts: &[String],
    ) -> Result<Vec<BatchItemResponse>, ClientError> {
        let url = format!("{}/classify/batch", self.base_url);
        info!(url = %url, count = texts.len(), "classifying batch");
        let resp = self
            .client
            .post(&url)
            .json(&BatchRequest::new(texts.to_vec()))
            .send()
            .await?;
        let batch: BatchResponse = read(resp).await?;
        info!(count = batch.count, "batch classified");
        Ok(batch.results)
    }
}

/// Decode a success body, or turn a non-2xx response into `ClientError::Server`
/// carrying the service's `error` field (or the raw body if it has none).
async fn read<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        let error = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        return Err(ClientError::Server {
            status: status.as_u16(),
            error,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    /// Serve canned responses on an ephemeral port; returns the base URL.
    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn canned() -> Router {
        Router::new()
            .route(
                "/health",
                get(|| async {
                    Json(json!({
                        "status": "online",
                        "message": "Forum Fisika AI API",
                        "model_loaded": true
                    }))
                }),
            )
            .route(
                "/classify",
                post(|Json(req): Json<Value>| async move {
                    Json(json!({
                        "success": true,
                        "text": req["text"],
                        "prediction": "Konsep Fisika",
                        "confidence": 0.7,
                        "probabilities": {
                            "Pertanyaan": 0.2,
                            "Konsep Fisika": 0.7,
                            "Penelitian": 0.1
                        }
                    }))
                }),
            )
            .route(
                "/classify/batch",
                post(|Json(req): Json<Value>| async move {
                    let texts = req["texts"].as_array().cloned().unwrap_or_default();
                    let results: Vec<Value> = texts
                        .iter()
                        .map(|t| json!({ "text": t, "prediction": "Pertanyaan", "confidence": 0.5 }))
                        .collect();
                    Json(json!({ "success": true, "count": results.len(), "results": results }))
                }),
            )
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = ClassifierClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[tokio::test]
    async fn health_without_version_field() {
        let client = ClassifierClient::new(spawn(canned()).await);
        let health = client.health().await.unwrap();
        assert!(health.model_loaded);
        assert_eq!(health.status, "online");
        assert!(health.version.is_empty());
    }

    #[tokio::test]
    async fn classify_sends_text_and_reads_probabilities() {
        let client = ClassifierClient::new(spawn(canned()).await);
        let resp = client.classify("gaya gravitasi").await.unwrap();
        assert_eq!(resp.text, "gaya gravitasi");
        assert_eq!(resp.prediction, "Konsep Fisika");
        assert_eq!(resp.probabilities.len(), 3);
        assert_eq!(resp.probabilities.get("Penelitian"), Some(0.1));
    }

    #[tokio::test]
    async fn batch_results_follow_input_order() {
        let client = ClassifierClient::new(spawn(canned()).await);
        let texts = vec!["satu".to_string(), "dua".to_string(), "tiga".to_string()];
        let results = client.classify_batch(&texts).await.unwrap();
        let echoed: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(echoed, ["satu", "dua", "tiga"]);
    }

    #[tokio::test]
    async fn server_error_carries_error_field() {
        let router = Router::new().route(
            "/classify",
            post(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "success": false, "error": "Model not loaded" })),
                )
            }),
        );
        let client = ClassifierClient::new(spawn(router).await);
        match client.classify("gaya").await {
            Err(ClientError::Server { status, error }) => {
                assert_eq!(status, 503);
                assert_eq!(error, "Model not loaded");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_without_json_body() {
        let client = ClassifierClient::new(spawn(Router::new()).await);
        match client.health().await {
            Err(ClientError::Server { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected server error, got {other:?}"),
        }
    }
}
