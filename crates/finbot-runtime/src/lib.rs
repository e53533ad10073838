//! # finbot-runtime
//!
//! Everything in finbot that waits on the outside world: remote report
//! backends, the fallback chain over them, the chat assistant and the
//! SQLite session store.
//!
//! ## Guarantees
//!
//! - [`ReportChain::generate_report`] always returns a report. The local
//!   synthesizer from `finbot-core` is the last tier and cannot fail.
//! - A report's `source` names the tier that wrote it.
//! - API keys never reach logs.
//!
//! ## Example
//!
//! ```rust,ignore
//! use finbot_runtime::{RuntimeConfig, ReportChain};
//! use finbot_core::{FinancialProfile, UserType};
//!
//! let config = RuntimeConfig::load("finbot.yaml".as_ref())?;
//! let chain = ReportChain::from_config_with_default_provider(&config)?;
//!
//! let profile = FinancialProfile::new(UserType::Student).with_income(2000.0);
//! let report = chain.generate_report(&profile, &config.primary.report_type).await;
//! println!("{} ({})", report.render(), report.source);
//! ```

pub mod assistant;
pub mod chain;
pub mod config;
pub mod prompts;
pub mod providers;
pub mod store;

pub use assistant::{language_name, Assistant, ChatReply, ChatReplyKind};
pub use chain::{PrimaryReportBackend, ReportBackend, ReportChain, SecondaryReportBackend};
pub use config::{ConfigError, RuntimeConfig};
pub use providers::{
    ApiCredential, BackendError, ChatMessage, CompletionConfig, CompletionResponse, LlmProvider,
    OpenAiCompatibleProvider, ReportServiceClient,
};
pub use store::{Session, SessionStore, SqliteSessionStore, StoreError};
