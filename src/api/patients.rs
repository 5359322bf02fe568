//! Patient admission endpoint

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Json;
use serde_json::Value;

use super::{error::ApiError, AppState};
use crate::patients::QueueEntry;

/// Admit a patient and hand back their queue number
pub async fn admit_patient(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<QueueEntry>, ApiError> {
    let Json(patient) = payload?;
    Ok(Json(state.patients.admit(patient).await?))
}
