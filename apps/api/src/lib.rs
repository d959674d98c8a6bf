//! # skitrack-api
//!
//! REST API for logging cross-country ski tours. All collaborators are
//! registered in a [`skitrack_core::Container`] at startup and resolved by
//! name per request.

pub mod bootstrap;
pub mod controllers;
pub mod error;
pub mod links;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod validators;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use skitrack_core::Container;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use routes::AppState;

pub const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const BODY_LIMIT: usize = 64 * 1024;

/// The complete application router over a frozen container
pub fn app(container: Arc<Container>) -> Router {
    routes::router(AppState::new(container))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
