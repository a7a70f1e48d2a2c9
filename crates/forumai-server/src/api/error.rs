//! Mapping of classify failures onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use forumai_ai::ClassifyError;
use forumai_core::api::ErrorResponse;
use tracing::{error, warn};

/// Handler error. Always rendered as `{"success": false, "error": ...}`.
#[derive(Debug)]
pub struct ApiError(pub ClassifyError);

impl From<ClassifyError> for ApiError {
    fn from(e: ClassifyError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            ClassifyError::InvalidInput(msg) => {
                warn!(error = %msg, "rejected request");
                (StatusCode::BAD_REQUEST, msg)
            }
            ClassifyError::ModelUnavailable(cause) => {
                warn!(cause = %cause, "classify requested without a loaded model");
                (StatusCode::SERVICE_UNAVAILABLE, "Model not loaded".to_string())
            }
            ClassifyError::InferenceFailure(e) => {
                error!(error = %e, "inference failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
