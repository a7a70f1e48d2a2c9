//! Health check endpoint

use axum::Json;
use axum::extract::State;
use forumai_core::api::HealthResponse;
use forumai_core::config::SERVICE_MESSAGE;

use crate::AppState;

/// GET / and GET /health
///
/// Always 200; `model_loaded` tells whether classify requests can succeed.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "online".to_string(),
        message: SERVICE_MESSAGE.to_string(),
        model_loaded: state.engine.is_ready(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
