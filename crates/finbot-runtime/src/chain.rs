//! Fallback chain for report generation.
//!
//! Tiers are tried in order, each at most once per request:
//! 1. **Primary**: the dedicated report service
//! 2. **Secondary**: a hosted chat model with a report prompt
//! 3. **Local**: [`ReportSynthesizer`], which cannot fail
//!
//! Every remote tier runs under an outer `tokio::time::timeout` on top of
//! the HTTP client's own timeout. When a lower tier writes the report, a
//! note explains why each higher tier was skipped. Notes never change
//! [`Report::source`].

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use finbot_core::{FinancialProfile, Report, ReportSource, ReportSynthesizer, LOCAL_GENERATOR};

use crate::config::RuntimeConfig;
use crate::prompts::{analysis_prompt, raw_content, REPORT_SYSTEM_PROMPT};
use crate::providers::{
    BackendError, ChatMessage, CompletionConfig, LlmProvider, OpenAiCompatibleProvider,
    ReportServiceClient,
};

/// Failure reasons longer than this are cut in notes.
const NOTE_REASON_LIMIT: usize = 100;

/// A remote tier that can write a report body.
#[async_trait]
pub trait ReportBackend: Send + Sync {
    /// Produce a non-empty report body.
    async fn generate(&self, profile: &FinancialProfile, report_type: &str) -> Result<String, BackendError>;

    /// Name shown to clients as the report's model.
    fn label(&self) -> &str;

    /// Upper bound on one call, enforced by the chain.
    fn timeout(&self) -> Duration;
}

/// Primary tier: the report service.
pub struct PrimaryReportBackend {
    client: ReportServiceClient,
}

impl PrimaryReportBackend {
    pub fn new(client: ReportServiceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReportBackend for PrimaryReportBackend {
    async fn generate(&self, profile: &FinancialProfile, report_type: &str) -> Result<String, BackendError> {
        self.client.generate(&raw_content(profile), report_type).await
    }

    fn label(&self) -> &str {
        "report service"
    }

    fn timeout(&self) -> Duration {
        self.client.timeout()
    }
}

/// Secondary tier: a chat model asked for a report.
pub struct SecondaryReportBackend {
    provider: Arc<dyn LlmProvider>,
    config: CompletionConfig,
    label: String,
}

impl SecondaryReportBackend {
    pub fn new(provider: Arc<dyn LlmProvider>, config: CompletionConfig) -> Self {
        let label = format!("{} (chat model)", config.model);
        Self {
            provider,
            config,
            label,
        }
    }
}

#[async_trait]
impl ReportBackend for SecondaryReportBackend {
    async fn generate(&self, profile: &FinancialProfile, _report_type: &str) -> Result<String, BackendError> {
        let messages = vec![
            ChatMessage::system(REPORT_SYSTEM_PROMPT),
            ChatMessage::user(analysis_prompt(profile)),
        ];
        let response = self.provider.complete(messages, &self.config).await?;
        if response.content.trim().is_empty() {
            return Err(BackendError::EmptyResponse);
        }
        Ok(response.content)
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }
}

/// Primary, then secondary, then the local synthesizer.
pub struct ReportChain {
    primary: Option<Arc<dyn ReportBackend>>,
    secondary: Option<Arc<dyn ReportBackend>>,
    synthesizer: ReportSynthesizer,
}

impl ReportChain {
    /// A chain with no remote tiers; every report is local.
    pub fn local_only() -> Self {
        Self {
            primary: None,
            secondary: None,
            synthesizer: ReportSynthesizer::new(),
        }
    }

    pub fn with_primary(mut self, backend: Arc<dyn ReportBackend>) -> Self {
        self.primary = Some(backend);
        self
    }

    pub fn with_secondary(mut self, backend: Arc<dyn ReportBackend>) -> Self {
        self.secondary = Some(backend);
        self
    }

    /// Wire both remote tiers from configuration.
    ///
    /// `provider` is the shared chat provider; the secondary tier uses the
    /// report token budget and temperature.
    pub fn from_config(config: &RuntimeConfig, provider: Arc<dyn LlmProvider>) -> Result<Self, BackendError> {
        let primary = PrimaryReportBackend::new(ReportServiceClient::from_config(&config.primary)?);
        let secondary = SecondaryReportBackend::new(
            provider,
            CompletionConfig {
                model: config.secondary.model.clone(),
                max_tokens: config.secondary.report_max_tokens,
                temperature: config.secondary.report_temperature,
                timeout: config.secondary.timeout,
            },
        );
        Ok(Self::local_only()
            .with_primary(Arc::new(primary))
            .with_secondary(Arc::new(secondary)))
    }

    /// Convenience for hosts that build the chat provider from config too.
    pub fn from_config_with_default_provider(config: &RuntimeConfig) -> Result<Self, BackendError> {
        let provider = Arc::new(OpenAiCompatibleProvider::from_config(&config.secondary)?);
        Self::from_config(config, provider)
    }

    /// Label of whatever produced a report with `source`.
    pub fn label_for(&self, source: ReportSource) -> String {
        let remote = match source {
            ReportSource::PrimaryBackend => self.primary.as_ref(),
            ReportSource::SecondaryBackend => self.secondary.as_ref(),
            ReportSource::LocalTemplate => None,
        };
        remote
            .map(|backend| backend.label().to_string())
            .unwrap_or_else(|| LOCAL_GENERATOR.to_string())
    }

    /// Generate a report. Never fails: the local tier always answers.
    pub async fn generate_report(&self, profile: &FinancialProfile, report_type: &str) -> Report {
        let mut notes = Vec::new();

        let tiers = [
            (ReportSource::PrimaryBackend, self.primary.as_ref()),
            (ReportSource::SecondaryBackend, self.secondary.as_ref()),
        ];

        for (source, backend) in tiers {
            let Some(backend) = backend else { continue };

            match run_tier(backend.as_ref(), profile, report_type).await {
                Ok(body) => {
                    tracing::info!(tier = %source, backend = backend.label(), "Report generated");
                    return finish(Report::new(body, source, report_type, Utc::now()), notes);
                }
                Err(e) => {
                    if e.is_timeout() {
                        tracing::warn!(tier = %source, timeout = ?backend.timeout(), "Report tier timed out");
                    } else {
                        tracing::warn!(tier = %source, error = %e, "Report tier failed");
                    }
                    notes.push(fallback_note(backend.label(), &e));
                }
            }
        }

        tracing::info!(tier = %ReportSource::LocalTemplate, "Report generated locally");
        let mut report = self.synthesizer.synthesize(profile);
        report.report_type = report_type.to_string();
        finish(report, notes)
    }
}

async fn run_tier(
    backend: &dyn ReportBackend,
    profile: &FinancialProfile,
    report_type: &str,
) -> Result<String, BackendError> {
    let timeout = backend.timeout();
    match tokio::time::timeout(timeout, backend.generate(profile, report_type)).await {
        Ok(Ok(body)) if body.trim().is_empty() => Err(BackendError::EmptyResponse),
        Ok(result) => result,
        // The abandoned call is dropped here, along with any late answer
        Err(_) => Err(BackendError::Timeout(timeout)),
    }
}

fn finish(mut report: Report, notes: Vec<String>) -> Report {
    report.notes.extend(notes);
    report
}

/// Note attached when a tier is skipped.
pub fn fallback_note(label: &str, error: &BackendError) -> String {
    if error.is_timeout() {
        format!(
            "⚡ Note: Generated using fast analysis due to high demand on the {}.",
            label
        )
    } else {
        let reason = error.to_string();
        let reason = crate::prompts::truncate_chars(&reason, NOTE_REASON_LIMIT);
        format!("⚠️ Note: Fallback analysis used due to: {}", reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finbot_core::{UserType, DEFAULT_REPORT_TYPE};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Behavior {
        Succeed(&'static str),
        Fail,
        Hang,
        Blank,
    }

    const BEHAVIORS: [Behavior; 4] = [
        Behavior::Succeed("remote report"),
        Behavior::Fail,
        Behavior::Hang,
        Behavior::Blank,
    ];

    struct MockBackend {
        label: &'static str,
        behavior: Behavior,
        calls: AtomicUsize,
        timeout: Duration,
    }

    impl MockBackend {
        fn new(label: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                label,
                behavior,
                calls: AtomicUsize::new(0),
                timeout: Duration::from_secs(5),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReportBackend for MockBackend {
        async fn generate(&self, _profile: &FinancialProfile, _report_type: &str) -> Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Succeed(body) => Ok(body.to_string()),
                Behavior::Fail => Err(BackendError::Api {
                    status: 500,
                    message: "x".repeat(300),
                }),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok("too late".to_string())
                }
                Behavior::Blank => Ok("   ".to_string()),
            }
        }

        fn label(&self) -> &str {
            self.label
        }

        fn timeout(&self) -> Duration {
            self.timeout
        }
    }

    fn profile() -> FinancialProfile {
        FinancialProfile::new(UserType::Student)
            .with_income(2000.0)
            .with_expenses(1500.0)
    }

    fn chain(primary: &Arc<MockBackend>, secondary: &Arc<MockBackend>) -> ReportChain {
        ReportChain::local_only()
            .with_primary(primary.clone())
            .with_secondary(secondary.clone())
    }

    /// The note a failed tier should leave behind.
    fn assert_note(note: &str, label: &str, behavior: Behavior, case: &str) {
        match behavior {
            Behavior::Hang => assert_eq!(
                note,
                format!("⚡ Note: Generated using fast analysis due to high demand on the {}.", label),
                "{}",
                case
            ),
            Behavior::Fail => assert!(
                note.starts_with("⚠️ Note: Fallback analysis used due to: API error: 500"),
                "{}: {}",
                case,
                note
            ),
            Behavior::Blank => assert!(
                note.starts_with("⚠️ Note: Fallback analysis used due to: ") && note.contains("empty response"),
                "{}: {}",
                case,
                note
            ),
            Behavior::Succeed(_) => panic!("{}: a successful tier leaves no note", case),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_tier_outcome_combination() {
        for primary_behavior in BEHAVIORS {
            for secondary_behavior in BEHAVIORS {
                let case = format!("primary={:?} secondary={:?}", primary_behavior, secondary_behavior);
                let primary = MockBackend::new("primary mock", primary_behavior);
                let secondary = MockBackend::new("secondary mock", secondary_behavior);

                let report = chain(&primary, &secondary)
                    .generate_report(&profile(), "summary")
                    .await;

                assert_eq!(report.report_type, "summary", "{}", case);
                assert_eq!(primary.calls(), 1, "{}", case);

                if let Behavior::Succeed(body) = primary_behavior {
                    assert_eq!(report.source, ReportSource::PrimaryBackend, "{}", case);
                    assert_eq!(report.body, body, "{}", case);
                    assert!(report.notes.is_empty(), "{}", case);
                    assert_eq!(secondary.calls(), 0, "{}", case);
                    continue;
                }

                assert_eq!(secondary.calls(), 1, "{}", case);
                assert_note(&report.notes[0], "primary mock", primary_behavior, &case);

                if let Behavior::Succeed(body) = secondary_behavior {
                    assert_eq!(report.source, ReportSource::SecondaryBackend, "{}", case);
                    assert_eq!(report.body, body, "{}", case);
                    assert_eq!(report.notes.len(), 1, "{}", case);
                } else {
                    assert_eq!(report.source, ReportSource::LocalTemplate, "{}", case);
                    assert!(report.body.contains(LOCAL_GENERATOR), "{}", case);
                    assert_eq!(report.notes.len(), 2, "{}", case);
                    assert_note(&report.notes[1], "secondary mock", secondary_behavior, &case);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_failure_reason_is_truncated() {
        let primary = MockBackend::new("primary mock", Behavior::Fail);
        let secondary = MockBackend::new("secondary mock", Behavior::Succeed("ok"));

        let report = chain(&primary, &secondary)
            .generate_report(&profile(), DEFAULT_REPORT_TYPE)
            .await;

        let reason = report.notes[0]
            .strip_prefix("⚠️ Note: Fallback analysis used due to: ")
            .unwrap();
        assert_eq!(reason.chars().count(), 100);
    }

    #[tokio::test]
    async fn test_local_only_chain() {
        let chain = ReportChain::local_only();
        let report = chain.generate_report(&profile(), DEFAULT_REPORT_TYPE).await;
        assert_eq!(report.source, ReportSource::LocalTemplate);
        assert!(report.notes.is_empty());
        assert_eq!(chain.label_for(report.source), LOCAL_GENERATOR);
    }

    #[test]
    fn test_label_for_remote_tiers() {
        let primary = MockBackend::new("primary mock", Behavior::Succeed("x"));
        let secondary = MockBackend::new("secondary mock", Behavior::Succeed("y"));
        let chain = chain(&primary, &secondary);
        assert_eq!(chain.label_for(ReportSource::PrimaryBackend), "primary mock");
        assert_eq!(chain.label_for(ReportSource::SecondaryBackend), "secondary mock");
        assert_eq!(chain.label_for(ReportSource::LocalTemplate), LOCAL_GENERATOR);
    }
}
