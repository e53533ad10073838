//! Client for the dedicated report-generation service.
//!
//! Protocol: `POST {url}` with `{ "raw_content", "report_type" }`, answered
//! by `{ "report": "..." }`. Anything other than a 200 carrying a non-empty
//! `report` string counts as a failure.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{http_client, BackendError};
use crate::config::PrimaryConfig;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    raw_content: &'a str,
    report_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    report: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReportServiceClient {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl ReportServiceClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            url: url.into(),
            timeout,
            client: http_client()?,
        })
    }

    pub fn from_config(config: &PrimaryConfig) -> Result<Self, BackendError> {
        Self::new(config.url.clone(), config.timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask the service for a report over `raw_content`.
    pub async fn generate(&self, raw_content: &str, report_type: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&GenerateRequest {
                raw_content,
                report_type,
            })
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: body.trim().chars().take(200).collect(),
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::from_reqwest(e, self.timeout))?;

        body.report
            .filter(|report| !report.trim().is_empty())
            .ok_or(BackendError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/generate-report", addr)
    }

    #[tokio::test]
    async fn test_generate_returns_report() {
        let app = Router::new().route(
            "/generate-report",
            post(|Json(body): Json<Value>| async move {
                let kind = body["report_type"].as_str().unwrap_or_default().to_string();
                Json(json!({ "report": format!("report of type {}", kind) }))
            }),
        );
        let client = ReportServiceClient::new(spawn(app).await, Duration::from_secs(5)).unwrap();

        let report = client.generate("income: 100", "summary").await.unwrap();
        assert_eq!(report, "report of type summary");
    }

    #[tokio::test]
    async fn test_non_200_is_api_error() {
        let app = Router::new().route(
            "/generate-report",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model loading") }),
        );
        let client = ReportServiceClient::new(spawn(app).await, Duration::from_secs(5)).unwrap();

        let err = client.generate("x", "y").await.unwrap_err();
        assert!(matches!(err, BackendError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_missing_or_blank_report_is_empty() {
        let app = Router::new().route(
            "/generate-report",
            post(|| async { Json(json!({ "report": "   " })) }),
        );
        let client = ReportServiceClient::new(spawn(app).await, Duration::from_secs(5)).unwrap();
        assert!(matches!(
            client.generate("x", "y").await,
            Err(BackendError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let app = Router::new().route("/generate-report", post(|| async { "not json" }));
        let client = ReportServiceClient::new(spawn(app).await, Duration::from_secs(5)).unwrap();
        assert!(matches!(
            client.generate("x", "y").await,
            Err(BackendError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let app = Router::new().route(
            "/generate-report",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "report": "late" }))
            }),
        );
        let client = ReportServiceClient::new(spawn(app).await, Duration::from_millis(200)).unwrap();
        let err = client.generate("x", "y").await.unwrap_err();
        assert!(err.is_timeout(), "expected timeout, got {:?}", err);
    }
}
