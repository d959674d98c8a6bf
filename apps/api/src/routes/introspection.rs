use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use skitrack_core::ContainerSnapshot;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/_health", get(health_handler))
        .route("/_container", get(container_handler))
        .route("/_container.dot", get(container_dot_handler))
}

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": skitrack_core::version(),
        "components": state.container.len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn container_handler(State(state): State<AppState>) -> Json<ContainerSnapshot> {
    Json(state.container.snapshot())
}

async fn container_dot_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/vnd.graphviz")],
        state.container.snapshot().to_dot(),
    )
}
