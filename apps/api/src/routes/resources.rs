use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use skitrack_core::Container;

use crate::controllers::ResourceController;
use crate::error::ApiResult;
use crate::validators::PageQuery;

/// State of one resource router: which controller to resolve
#[derive(Clone)]
struct ResourceRoute {
    container: Arc<Container>,
    controller: &'static str,
}

impl ResourceRoute {
    fn controller(&self) -> ApiResult<Arc<ResourceController>> {
        Ok(self.container.resolve_as::<ResourceController>(self.controller)?)
    }
}

pub fn router<S>(container: Arc<Container>, controller: &'static str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(find_all).post(create))
        .route(
            "/:id",
            get(find)
                .patch(partially_update)
                .put(update)
                .delete(delete),
        )
        .with_state(ResourceRoute {
            container,
            controller,
        })
}

async fn find_all(
    State(route): State<ResourceRoute>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Value>> {
    Ok(Json(route.controller()?.find_all(&query)?))
}

async fn create(
    State(route): State<ResourceRoute>,
    Json(body): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let created = route.controller()?.create(body)?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, created.location)],
        Json(created.body),
    ))
}

async fn find(
    State(route): State<ResourceRoute>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    Ok(Json(route.controller()?.find(&id)?))
}

async fn partially_update(
    State(route): State<ResourceRoute>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    Ok(Json(route.controller()?.partially_update(&id, body)?))
}

async fn update(
    State(route): State<ResourceRoute>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    Ok(Json(route.controller()?.update(&id, body)?))
}

async fn delete(
    State(route): State<ResourceRoute>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    route.controller()?.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
