//! Shopping list endpoint handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::Value;

use super::{error::ApiError, AppState};

pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    Ok(Json(state.shopping.list().await?))
}

pub async fn append_item(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(item) = payload?;
    state.shopping.append(item).await?;
    Ok(StatusCode::OK)
}

pub async fn replace_item(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(item) = payload?;
    state.shopping.replace(index, item).await?;
    Ok(StatusCode::OK)
}

pub async fn patch_item(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(partial) = payload?;
    state.shopping.patch(index, partial).await?;
    Ok(StatusCode::OK)
}

pub async fn remove_item(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<StatusCode, ApiError> {
    state.shopping.remove(index).await?;
    Ok(StatusCode::OK)
}
