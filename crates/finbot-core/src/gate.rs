//! Topic gate: decides whether free text is about personal finance.
//!
//! Classification is a case-insensitive substring match against a fixed
//! vocabulary. There is no stemming and no negation handling, so "syntax"
//! matches "tax". Missing a real finance question is the failure mode to
//! avoid; an occasional false positive is acceptable.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terms that mark text as finance-related.
pub const FINANCE_TERMS: &[&str] = &[
    // Core financial terms
    "finance", "financial", "money", "budget", "budgeting", "income", "expense", "expenses",
    "savings", "save", "saving", "investment", "invest", "investing", "portfolio",
    "loan", "loans", "credit", "debt", "mortgage", "interest", "rate", "rates",
    // Tax
    "tax", "taxes", "taxation", "deduction", "deductions", "refund", "irs",
    "filing", "return", "exemption", "taxable", "income tax", "gst", "vat",
    // Banking and accounts
    "bank", "banking", "account", "checking", "deposit", "withdrawal",
    "atm", "card", "payment", "transaction", "balance", "statement",
    // Insurance and financial products
    "insurance", "policy", "premium", "claim", "retirement", "pension",
    "401k", "ira", "mutual fund", "etf", "stock", "stocks", "bond", "bonds",
    // Financial planning
    "goal", "goals", "planning", "wealth", "asset", "assets", "liability",
    "net worth", "cash flow", "emergency fund", "financial plan",
    // Business finance
    "business", "startup", "revenue", "profit", "loss", "accounting",
    "bookkeeping", "invoice", "payroll", "entrepreneur",
    // Economy
    "economy", "economic", "inflation", "recession", "market", "currency",
    "exchange", "forex", "commodity", "real estate", "property",
];

/// Reply for questions outside the finance domain.
pub const OFF_TOPIC_REPLY: &str = "I'm a specialized financial assistant. I can only help with \
questions related to finance, tax, savings, loans, investments, budgeting, and financial \
planning. Please ask me about financial topics!";

lazy_static! {
    /// One alternation over every finance term, case-insensitive.
    static ref FINANCE_PATTERN: Regex = build_alternation(FINANCE_TERMS);

    /// Phrases asking for a report, in priority order.
    static ref REPORT_PATTERNS: Vec<(ReportRequest, Regex)> = vec![
        (
            ReportRequest::Comprehensive,
            build_alternation(&[
                "generate report",
                "create report",
                "full report",
                "comprehensive report",
                "detailed report",
            ]),
        ),
        (
            ReportRequest::Summary,
            build_alternation(&["summarize", "summary", "overview", "brief report"]),
        ),
        (
            ReportRequest::Analysis,
            build_alternation(&["analyze", "analysis", "assess", "evaluate", "review"]),
        ),
    ];
}

fn build_alternation(terms: &[&str]) -> Regex {
    let alternation = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    // Terms are escaped literals, so the pattern is always valid.
    RegexBuilder::new(&alternation)
        .case_insensitive(true)
        .build()
        .unwrap()
}

/// Whether `text` mentions any finance term.
pub fn is_in_domain(text: &str) -> bool {
    FINANCE_PATTERN.is_match(text)
}

/// Every vocabulary term that occurs in `text`, in vocabulary order.
///
/// The alternation above stops at the first hit; this walks the whole
/// list so overlapping terms ("income" and "income tax") are all reported.
pub fn matched_terms(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    FINANCE_TERMS
        .iter()
        .copied()
        .filter(|term| lowered.contains(term))
        .collect()
}

/// The kind of report a chat message asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportRequest {
    Comprehensive,
    Summary,
    Analysis,
}

impl fmt::Display for ReportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportRequest::Comprehensive => write!(f, "comprehensive"),
            ReportRequest::Summary => write!(f, "summary"),
            ReportRequest::Analysis => write!(f, "analysis"),
        }
    }
}

/// Detect a report request. Comprehensive wins over summary, summary over analysis.
pub fn detect_report_request(text: &str) -> Option<ReportRequest> {
    REPORT_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(text))
        .map(|(kind, _)| *kind)
}
