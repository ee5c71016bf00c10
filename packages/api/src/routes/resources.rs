use axum::{
    extract::{Path, Query, State},
    http::{header::HOST, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use shared::models::pagination::Page;
use shared::models::resources::ResourceKind;
use tracing::debug;

use crate::{error::ApiError, middleware::auth::AuthenticatedUser, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{resource}/", get(list_items).post(create_item))
        .route(
            "/{resource}/{id}/",
            get(get_item)
                .put(replace_item)
                .patch(update_item)
                .delete(delete_item),
        )
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    page: Option<usize>,
}

fn parse_kind(resource: &str) -> Result<ResourceKind, ApiError> {
    resource
        .parse()
        .map_err(|_| ApiError::UnknownResource(resource.to_string()))
}

fn parse_target(resource: &str, id: &str) -> Result<(ResourceKind, i64), ApiError> {
    let kind = parse_kind(resource)?;
    let id = id
        .parse()
        .map_err(|_| ApiError::UnknownResource(format!("{}/{}", resource, id)))?;
    Ok((kind, id))
}

fn page_url(headers: &HeaderMap, kind: ResourceKind, page: usize) -> String {
    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    if page == 1 {
        format!("http://{}/api/{}/", host, kind.path())
    } else {
        format!("http://{}/api/{}/?page={}", host, kind.path(), page)
    }
}

async fn list_items(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(resource): Path<String>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<Page<Value>>, ApiError> {
    let kind = parse_kind(&resource)?;
    let slice = state
        .resource_service
        .list(kind, query.page.unwrap_or(1))
        .await?;

    debug!(
        "{} listed {} page {}",
        user.username.as_deref().unwrap_or("anonymous"),
        kind,
        slice.page
    );
    Ok(Json(Page {
        count: slice.count as u64,
        next: slice
            .has_next
            .then(|| page_url(&headers, kind, slice.page + 1)),
        previous: (slice.page > 1).then(|| page_url(&headers, kind, slice.page - 1)),
        results: slice.results,
    }))
}

async fn create_item(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let kind = parse_kind(&resource)?;
    let item = state.resource_service.create(kind, body).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_item(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let (kind, id) = parse_target(&resource, &id)?;
    Ok(Json(state.resource_service.get(kind, id).await?))
}

async fn replace_item(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path((resource, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let (kind, id) = parse_target(&resource, &id)?;
    Ok(Json(
        state.resource_service.update(kind, id, body, false).await?,
    ))
}

async fn update_item(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path((resource, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let (kind, id) = parse_target(&resource, &id)?;
    Ok(Json(
        state.resource_service.update(kind, id, body, true).await?,
    ))
}

async fn delete_item(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path((resource, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let (kind, id) = parse_target(&resource, &id)?;
    state.resource_service.delete(kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
