//! Single and batch classification endpoints

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use forumai_ai::{ClassifyError, InferenceError, Orchestrator};
use forumai_core::api::{BatchRequest, BatchResponse, ClassifyRequest, ClassifyResponse};

use crate::AppState;
use crate::api::ApiError;

/// POST /classify
///
/// Body `{"text": "..."}`; responds with the prediction and the full
/// probability map.
pub async fn classify(
    State(state): State<AppState>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let request = accept(&state.engine, payload)?;
    let result = state.engine.classify_one(request.text())?;
    Ok(Json(ClassifyResponse::from_result(
        request.text().to_string(),
        result,
    )))
}

/// POST /classify/batch
///
/// Body `{"texts": [...]}`; responds with label and confidence per text,
/// in request order. Runs on the blocking pool so a long batch does not
/// hold an async worker.
pub async fn classify_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    let texts = accept(&state.engine, payload)?.into_texts();
    let engine = Arc::clone(&state.engine);
    let items = tokio::task::spawn_blocking(move || engine.classify_batch(&texts))
        .await
        .map_err(|e| ClassifyError::from(InferenceError::Aborted(e.to_string())))??;
    Ok(Json(BatchResponse::from_items(items)))
}

/// Unwrap a JSON body. An unreadable body is `InvalidInput`, unless the
/// model is unavailable, which is reported first.
fn accept<T>(
    engine: &Orchestrator,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    match payload {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => {
            if let Some(cause) = engine.state().failure() {
                return Err(ClassifyError::ModelUnavailable(cause.to_string()).into());
            }
            Err(ClassifyError::InvalidInput(rejection.body_text()).into())
        }
    }
}
