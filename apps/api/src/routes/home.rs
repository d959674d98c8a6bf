use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use super::AppState;
use crate::bootstrap::HOME_CONTROLLER;
use crate::controllers::HomeController;
use crate::error::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

async fn index(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let controller = state.container.resolve_as::<HomeController>(HOME_CONTROLLER)?;
    Ok(Json(controller.index()))
}
