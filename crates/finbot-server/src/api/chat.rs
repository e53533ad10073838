use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use finbot_core::UserType;
use finbot_runtime::ChatReply;

use super::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user_type: UserType,
    #[serde(default)]
    pub language: Option<String>,
}

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    req: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(req) = req?;
    let language = req.language.as_deref().unwrap_or("english");
    Ok(Json(state.assistant.reply(&req.message, req.user_type, language).await))
}
