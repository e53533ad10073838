//! Prompts and payloads sent to remote backends.

use finbot_core::{format::currency, format::percent, synthesizer::CashFlow, FinancialProfile};

/// System prompt for report generation on the chat backend.
pub const REPORT_SYSTEM_PROMPT: &str = "You are an expert financial advisor specializing in \
comprehensive financial analysis and reporting. Provide detailed, specific, and actionable \
financial advice with concrete numbers and strategies.";

/// System prompt for conversational answers.
///
/// The topic gate runs before any call, so this is a second line of
/// scoping rather than the only one.
pub const CHAT_SYSTEM_PROMPT: &str = "You are a specialized financial assistant. You ONLY answer \
questions related to finance, tax, savings, loans, investments, budgeting, financial planning, \
banking, insurance, and financial laws. If asked about anything else, politely redirect the \
conversation back to financial topics. Provide helpful, accurate financial advice based on the \
user's profile.";

/// Chat history beyond this many characters is cut from report prompts.
pub const CHAT_HISTORY_LIMIT: usize = 500;

/// Truncate to at most `max` characters, never splitting a character.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// User prompt asking the chat backend for a full report.
pub fn analysis_prompt(profile: &FinancialProfile) -> String {
    let flow = CashFlow::from_profile(profile).ok();
    let amount = |value: Option<f64>| value.map(currency).unwrap_or_else(|| "N/A".to_string());

    let savings_rate = flow
        .and_then(|f| f.savings_rate())
        .map(percent)
        .unwrap_or_else(|| "N/A".to_string());
    let goal = if profile.has_goal() {
        profile.goal.trim()
    } else {
        "Not specified"
    };
    let goal_amount = profile
        .goal_target()
        .map(currency)
        .unwrap_or_else(|| "Not specified".to_string());

    let history = truncate_chars(&profile.chat_history, CHAT_HISTORY_LIMIT);
    let ellipsis = if history.len() < profile.chat_history.len() {
        "..."
    } else {
        ""
    };

    format!(
        r#"As a professional financial advisor, create a comprehensive financial report for a {user_type} with the following data:

FINANCIAL SNAPSHOT:
- Monthly Income: {income}
- Monthly Expenses: {expenses}
- Monthly Savings: {savings}
- Savings Rate: {savings_rate}
- Financial Goal: {goal}
- Goal Amount: {goal_amount}

CHAT HISTORY: {history}{ellipsis}

Please provide a detailed analysis covering:
1. Current Financial Health Assessment
2. Savings and Spending Analysis
3. Goal Achievement Strategy
4. Risk Assessment and Recommendations
5. Actionable Next Steps

Keep the report professional, specific, and actionable with concrete numbers and percentages."#,
        user_type = profile.user_type,
        income = amount(flow.map(|f| f.income)),
        expenses = amount(flow.map(|f| f.expenses)),
        savings = amount(flow.map(|f| f.savings)),
    )
}

/// The `key: value` block the report service expects as `raw_content`.
///
/// Amounts are passed through as the caller wrote them.
pub fn raw_content(profile: &FinancialProfile) -> String {
    let raw = |value: &Option<finbot_core::AmountInput>| {
        value.as_ref().map(|a| a.raw()).unwrap_or_default()
    };

    format!(
        "user_type: {}\nincome: {}\nexpenses: {}\ngoal: {}\ngoal_amount: {}\nchat_history: {}",
        profile.user_type,
        raw(&profile.income),
        raw(&profile.expenses),
        profile.goal,
        raw(&profile.goal_amount),
        profile.chat_history,
    )
}

/// User content for a chat turn.
pub fn chat_prompt(user_type: finbot_core::UserType, prompt: &str) -> String {
    format!("As a {}, {}", user_type, prompt)
}
