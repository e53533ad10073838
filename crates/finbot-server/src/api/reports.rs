//! Report endpoints: fresh profiles, saved sessions and document download.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use finbot_core::{FinancialProfile, Report, ReportDocument, ReportSource, DOCUMENT_MEDIA_TYPE};

use super::sessions::load_session;
use super::ApiError;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    /// Body with any fallback notes appended
    pub report: String,
    /// What wrote the body: a backend label or the local engine
    pub model: String,
    pub source: ReportSource,
    pub report_type: String,
    pub status: String,
}

impl ReportResponse {
    fn new(state: &AppState, report: &Report) -> Self {
        Self {
            report: report.render(),
            model: state.chain.label_for(report.source),
            source: report.source,
            report_type: report.report_type.clone(),
            status: "success".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub session_id: i64,
}

/// POST /generate-comprehensive-report
pub async fn generate_report(
    State(state): State<AppState>,
    profile: Result<Json<FinancialProfile>, JsonRejection>,
) -> Result<Json<ReportResponse>, ApiError> {
    let Json(profile) = profile?;
    let report = state.chain.generate_report(&profile, &state.report_type).await;
    Ok(Json(ReportResponse::new(&state, &report)))
}

/// POST /analyze-my-finances
pub async fn analyze_session(
    State(state): State<AppState>,
    req: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ReportResponse>, ApiError> {
    let Json(req) = req?;
    let session = load_session(&state, req.session_id).await?;
    let report = state
        .chain
        .generate_report(&session.profile, &state.report_type)
        .await;
    Ok(Json(ReportResponse::new(&state, &report)))
}

/// POST /generate-document
pub async fn generate_document(
    State(state): State<AppState>,
    profile: Result<Json<FinancialProfile>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(profile) = profile?;
    let report = state.chain.generate_report(&profile, &state.report_type).await;
    let document = ReportDocument::build(&report, &profile);
    let bytes = document.to_bytes()?;
    tracing::info!(filename = %document.filename, source = %report.source, "Document generated");

    Ok((
        [
            (header::CONTENT_TYPE, DOCUMENT_MEDIA_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.filename),
            ),
        ],
        bytes,
    ))
}
