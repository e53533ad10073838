//! Session endpoints. Store calls are blocking and run off the async workers.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use finbot_core::FinancialProfile;
use finbot_runtime::Session;

use super::{ApiError, SESSION_NOT_FOUND};
use crate::AppState;

/// Load a session or fail with 404.
pub(crate) async fn load_session(state: &AppState, id: i64) -> Result<Session, ApiError> {
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || store.lookup(id))
        .await??
        .ok_or(ApiError::NotFound(SESSION_NOT_FOUND))
}

/// POST /save-session
pub async fn save_session(
    State(state): State<AppState>,
    profile: Result<Json<FinancialProfile>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(profile) = profile?;
    let store = state.store.clone();
    let id = tokio::task::spawn_blocking(move || store.append(&profile)).await??;
    Ok(Json(json!({ "status": "success", "session_id": id })))
}

/// GET /get-session/:id
pub async fn get_session(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let session = load_session(&state, id).await?;
    Ok(Json(json!({ "session": session })))
}
