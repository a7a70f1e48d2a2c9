//! HTTP boundary: translates JSON requests into orchestrator calls.

use std::sync::Arc;

use axum::Router;
use forumai_ai::Orchestrator;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(engine: Orchestrator) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::health_check))
        .route("/health", get(api::health_check))
        .route("/classify", post(api::classify))
        .route("/classify/batch", post(api::classify_batch))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve `router` on `bind` until the process is stopped.
pub async fn serve(bind: &str, router: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("forumai listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await
}
