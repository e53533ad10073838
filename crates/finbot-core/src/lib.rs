//! # finbot-core
//!
//! Deterministic building blocks of the finbot personal-finance assistant.
//!
//! Nothing in this crate talks to the network or to disk, apart from
//! writing an exported document when asked to:
//! - **Topic gate**: is a question about personal finance?
//! - **Report synthesizer**: a complete report built from the profile alone
//! - **Planner**: budget summary, goal plan and spending insights
//! - **Export**: reports laid out as downloadable Word (`.docx`) documents
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: the same profile and timestamp give the same report
//! 2. **No model calls**: local reports never claim to come from a model
//! 3. **Total**: bad amounts degrade one report section, never the report
//!
//! ## Example
//!
//! ```rust,ignore
//! use finbot_core::{FinancialProfile, ReportSynthesizer, UserType, is_in_domain};
//!
//! assert!(is_in_domain("How should I budget my income?"));
//!
//! let profile = FinancialProfile::new(UserType::Student)
//!     .with_income(2000.0)
//!     .with_expenses(1500.0)
//!     .with_goal("Laptop");
//! let report = ReportSynthesizer::new().synthesize(&profile);
//! println!("{}", report.render());
//! ```

pub mod export;
pub mod format;
pub mod gate;
pub mod planner;
pub mod report;
pub mod synthesizer;
pub mod types;

// Re-export main types at crate root
pub use export::{Block, ExportError, ReportDocument, DOCUMENT_MEDIA_TYPE};
pub use gate::{detect_report_request, is_in_domain, matched_terms, ReportRequest, OFF_TOPIC_REPLY};
pub use planner::{budget_summary, goal_plan, spending_insights, GoalPlan, DEFAULT_GOAL_MONTHS};
pub use report::{Report, ReportSource};
pub use synthesizer::{ReportSynthesizer, DEFAULT_REPORT_TYPE, LOCAL_GENERATOR};
pub use types::{AmountError, AmountInput, FinancialProfile, UnknownUserType, UserType};
