//! HTTP routes
//!
//! Handlers resolve their controller from the shared container on every
//! request, by registration name.

mod home;
mod introspection;
mod resources;

use std::sync::Arc;

use axum::Router;
use skitrack_core::Container;

use crate::bootstrap::RESOURCES;
use crate::links::API_PREFIX;

/// Router state: the frozen container
#[derive(Clone)]
pub struct AppState {
    pub container: Arc<Container>,
}

impl AppState {
    pub fn new(container: Arc<Container>) -> Self {
        Self { container }
    }
}

pub fn router(state: AppState) -> Router {
    let api = RESOURCES.iter().fold(home::router(), |api, resource| {
        api.nest(
            &format!("/{}", resource.collection),
            resources::router(state.container.clone(), resource.controller),
        )
    });

    Router::new()
        .nest(API_PREFIX, api)
        .merge(introspection::router())
        .with_state(state)
}
