//! Collection endpoint handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::Value;

use super::{error::ApiError, AppState};
use crate::registry::CollectionInfo;

/// Body of `PUT /collections/{name}`
#[derive(Debug, Deserialize)]
pub struct RegisterCollectionRequest {
    /// JSON Schema of the collection's items, as text
    pub schema: String,
}

/// Register a collection
pub async fn register_collection(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<RegisterCollectionRequest>, JsonRejection>,
) -> Result<Json<CollectionInfo>, ApiError> {
    let Json(request) = payload?;
    let info = state.collections.register(&name, &request.schema).await?;
    Ok(Json(info))
}

/// Describe a collection: its merged schema, checksum and item count
pub async fn describe_collection(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CollectionInfo>, ApiError> {
    Ok(Json(state.collections.describe(&name).await?))
}

/// List every item of a collection
pub async fn list_items(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Value>>, ApiError> {
    Ok(Json(state.collections.list(&name).await?))
}

/// Add an item; the response carries the generated id
pub async fn create_item(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(doc) = payload?;
    Ok(Json(state.collections.create(&name, doc).await?))
}

/// Replace an item
pub async fn update_item(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(doc) = payload?;
    Ok(Json(state.collections.update(&name, &id, doc).await?))
}

/// Remove an item
pub async fn delete_item(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.collections.delete(&name, &id).await?;
    Ok(StatusCode::OK)
}
