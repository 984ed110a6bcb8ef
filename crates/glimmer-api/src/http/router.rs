//! Axum router configuration for the relay.
//!
//! Routes: `POST /relay` and `GET /health`.
//! Middleware: permissive CORS, request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::relay::{self, RelayState};

/// Build the relay router with all routes and middleware.
pub fn build_router(state: RelayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/relay", post(relay::forward))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_shape() {
        let axum::Json(body) = health_check().await;
        assert_eq!(body["status"], "ok");
        assert!(body["version"].is_string());
    }
}
