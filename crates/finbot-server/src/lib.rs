//! finbot-server: HTTP API over the finbot assistant.
//!
//! Handlers are thin. Topic gating, report generation and storage live in
//! `finbot-core` and `finbot-runtime`; this crate maps them onto routes.

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use finbot_runtime::{Assistant, ReportChain, SessionStore};

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<ReportChain>,
    pub assistant: Arc<Assistant>,
    pub store: Arc<dyn SessionStore>,
    /// Report type requested from the primary backend
    pub report_type: String,
}

impl AppState {
    pub fn new(
        chain: ReportChain,
        assistant: Assistant,
        store: Arc<dyn SessionStore>,
        report_type: impl Into<String>,
    ) -> Self {
        Self {
            chain: Arc::new(chain),
            assistant: Arc::new(assistant),
            store,
            report_type: report_type.into(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(api::chat))
        .route("/budget-summary", post(api::budget_summary))
        .route("/goal-calculation", post(api::goal_calculation))
        .route("/spending-insights", post(api::spending_insights))
        .route("/save-session", post(api::save_session))
        .route("/get-session/:id", get(api::get_session))
        .route("/generate-comprehensive-report", post(api::generate_report))
        .route("/analyze-my-finances", post(api::analyze_session))
        .route("/generate-document", post(api::generate_document))
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until the listener fails.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("finbot listening on http://{}", addr);
        tracing::info!("Health check: http://{}/health", addr);
    }
    axum::serve(listener, build_router(state)).await
}
