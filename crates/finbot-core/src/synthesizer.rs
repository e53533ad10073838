//! Report synthesizer: builds a financial report without any model.
//!
//! The pipeline is fixed:
//! 1. Health analysis (savings rate and expense ratio bands)
//! 2. Recommendations (cash-flow sign, user type, goal)
//! 3. Action items (fixed checklist plus conditional items)
//! 4. Assembly into one text block with section banners
//!
//! Every section degrades on its own: bad numbers turn one section into an
//! "unable to analyze" sentence, they never fail the report.

use chrono::{DateTime, Utc};

use crate::format::{currency, display_amount, percent};
use crate::report::{Report, ReportSource};
use crate::types::{AmountError, FinancialProfile, UserType};

/// Report type used when the caller does not name one.
pub const DEFAULT_REPORT_TYPE: &str = "comprehensive_financial_analysis";

/// Name printed in the footer of locally generated reports.
pub const LOCAL_GENERATOR: &str = "finbot local analysis engine (no AI model)";

const HEAVY_RULE: &str = "═══════════════════════════════════════════════════════════════";
const SECTION_RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Savings-rate band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavingsBand {
    /// Above 20%
    Excellent,
    /// Above 10%, up to 20%
    Good,
    /// Above 0%, up to 10%
    Low,
    /// Zero or below
    Negative,
}

impl SavingsBand {
    pub fn classify(rate: f64) -> Self {
        if rate > 20.0 {
            SavingsBand::Excellent
        } else if rate > 10.0 {
            SavingsBand::Good
        } else if rate > 0.0 {
            SavingsBand::Low
        } else {
            SavingsBand::Negative
        }
    }

    fn describe(&self, rate: f64) -> String {
        let rate = percent(rate);
        match self {
            SavingsBand::Excellent => format!("Excellent savings rate: {} (Above recommended 20%)", rate),
            SavingsBand::Good => format!("Good savings rate: {} (Above minimum 10%)", rate),
            SavingsBand::Low => format!("Low savings rate: {} (Below recommended 10%)", rate),
            SavingsBand::Negative => format!("Negative savings: {} (Expenses exceed income)", rate),
        }
    }
}

/// Expense-ratio band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseBand {
    /// Above 80% of income
    High,
    /// Above 70%, up to 80%
    Moderate,
    Healthy,
}

impl ExpenseBand {
    pub fn classify(ratio: f64) -> Self {
        if ratio > 80.0 {
            ExpenseBand::High
        } else if ratio > 70.0 {
            ExpenseBand::Moderate
        } else {
            ExpenseBand::Healthy
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            ExpenseBand::High => "High expense ratio - requires immediate attention",
            ExpenseBand::Moderate => "Moderate expense ratio - room for improvement",
            ExpenseBand::Healthy => "Healthy expense ratio - good financial discipline",
        }
    }
}

/// Monthly cash flow derived from a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashFlow {
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
}

impl CashFlow {
    pub fn from_profile(profile: &FinancialProfile) -> Result<Self, AmountError> {
        let (income, expenses) = profile.cash_flow()?;
        Ok(Self {
            income,
            expenses,
            savings: income - expenses,
        })
    }

    /// Savings as a percentage of income; `None` when there is no income.
    pub fn savings_rate(&self) -> Option<f64> {
        (self.income > 0.0).then(|| self.savings * 100.0 / self.income)
    }

    /// Expenses as a percentage of income; `None` when there is no income.
    pub fn expense_ratio(&self) -> Option<f64> {
        (self.income > 0.0).then(|| self.expenses * 100.0 / self.income)
    }
}

/// Builds the local, deterministic report.
pub struct ReportSynthesizer;

impl ReportSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Synthesize a report stamped with the current time.
    pub fn synthesize(&self, profile: &FinancialProfile) -> Report {
        self.synthesize_at(profile, Utc::now())
    }

    /// Synthesize a report stamped with `now`.
    ///
    /// Output is a pure function of `profile` and `now`.
    pub fn synthesize_at(&self, profile: &FinancialProfile, now: DateTime<Utc>) -> Report {
        Report::new(
            self.assemble(profile, now),
            ReportSource::LocalTemplate,
            DEFAULT_REPORT_TYPE,
            now,
        )
    }

    /// Section 1: savings rate and expense ratio.
    pub fn health_analysis(&self, profile: &FinancialProfile) -> Vec<String> {
        let flow = match CashFlow::from_profile(profile) {
            Ok(flow) => flow,
            Err(e) => {
                tracing::debug!(error = %e, "health analysis skipped");
                return vec![bullet("Unable to analyze due to invalid financial data")];
            }
        };

        let (Some(rate), Some(ratio)) = (flow.savings_rate(), flow.expense_ratio()) else {
            return vec![bullet("Insufficient data for comprehensive analysis")];
        };

        vec![
            bullet(&SavingsBand::classify(rate).describe(rate)),
            bullet(&format!("Expense ratio: {} of income", percent(ratio))),
            bullet(ExpenseBand::classify(ratio).describe()),
        ]
    }

    /// Section 2: personalized recommendations.
    pub fn recommendations(&self, profile: &FinancialProfile) -> Vec<String> {
        let flow = match CashFlow::from_profile(profile) {
            Ok(flow) => flow,
            Err(e) => {
                tracing::debug!(error = %e, "recommendations degraded");
                return vec![bullet("Ensure accurate financial data for better recommendations")];
            }
        };

        let mut lines = Vec::new();

        if flow.savings > 0.0 {
            lines.push(bullet("Continue maintaining positive cash flow"));
            lines.push(bullet("Consider increasing savings rate to 20% if possible"));
        } else {
            lines.push(bullet("Urgent: Review and reduce monthly expenses"));
            lines.push(bullet("Create a detailed budget to track spending"));
        }

        match profile.user_type {
            UserType::Student => {
                lines.push(bullet("Focus on building emergency fund (3-6 months expenses)"));
                lines.push(bullet("Consider part-time income opportunities"));
                lines.push(bullet("Look into student-specific financial products"));
            }
            UserType::Professional => {
                lines.push(bullet("Maximize employer retirement contributions"));
                lines.push(bullet("Consider diversifying income streams"));
                lines.push(bullet("Review insurance coverage adequacy"));
            }
        }

        if let Some(target) = profile.goal_target() {
            lines.push(bullet(&format!(
                "To reach your goal in 1 year, save {} monthly",
                currency(target / 12.0)
            )));
        }

        lines
    }

    /// Section 3: the action checklist.
    pub fn action_items(&self, profile: &FinancialProfile) -> Vec<String> {
        let mut actions: Vec<String> = [
            "1. Set up automatic savings transfer for consistent saving habit",
            "2. Review and categorize all monthly expenses",
            "3. Create a monthly budget and stick to it",
            "4. Track progress toward financial goals weekly",
            "5. Review and update financial plan quarterly",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        if let Ok(flow) = CashFlow::from_profile(profile) {
            if flow.expenses >= flow.income {
                actions.insert(
                    0,
                    "PRIORITY: Immediately reduce expenses or increase income".to_string(),
                );
            }
        }

        if profile.has_goal() && profile.goal_target().is_none() {
            actions.push("6. Define specific monetary target for your financial goal".to_string());
        }

        actions
    }

    /// Section 4: put everything together.
    fn assemble(&self, profile: &FinancialProfile, now: DateTime<Utc>) -> String {
        let net_savings = match (&profile.income, &profile.expenses) {
            (Some(_), Some(_)) => CashFlow::from_profile(profile)
                .map(|flow| currency(flow.savings))
                .unwrap_or_else(|_| "N/A".to_string()),
            _ => "N/A".to_string(),
        };

        let goal = if profile.has_goal() {
            profile.goal.trim().to_string()
        } else {
            "No goal specified".to_string()
        };

        let mut out = String::new();
        out.push_str("╔════════════════════════════════════════════════════════════╗\n");
        out.push_str("║                  FINANCIAL ANALYSIS REPORT                 ║\n");
        out.push_str("╚════════════════════════════════════════════════════════════╝\n\n");

        section(&mut out, "📊 FINANCIAL OVERVIEW", &[
            format!("Monthly Income:     {}", display_amount(profile.income.as_ref(), "N/A")),
            format!("Monthly Expenses:   {}", display_amount(profile.expenses.as_ref(), "N/A")),
            format!("Net Savings:        {}", net_savings),
        ]);
        section(&mut out, "🎯 FINANCIAL GOALS", &[
            format!("Primary Goal:       {}", goal),
            format!("Target Amount:      {}", display_amount(profile.goal_amount.as_ref(), "N/A")),
            format!("User Type:          {}", profile.user_type.title()),
        ]);
        section(&mut out, "📈 FINANCIAL ANALYSIS", &self.health_analysis(profile));
        section(&mut out, "💡 RECOMMENDATIONS", &self.recommendations(profile));
        section(&mut out, "📋 ACTION ITEMS", &self.action_items(profile));

        out.push_str(HEAVY_RULE);
        out.push('\n');
        out.push_str(&format!("Report generated by: {}\n", LOCAL_GENERATOR));
        out.push_str(&format!("Generated on: {}\n", now.format("%Y-%m-%d %H:%M:%S UTC")));
        out.push_str(HEAVY_RULE);
        out.push('\n');
        out
    }
}

impl Default for ReportSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

fn bullet(text: &str) -> String {
    format!("• {}", text)
}

fn section(out: &mut String, title: &str, lines: &[String]) {
    out.push_str(title);
    out.push('\n');
    out.push_str(SECTION_RULE);
    out.push_str("\n\n");
    out.push_str(&lines.join("\n"));
    out.push_str("\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn profile(income: f64, expenses: f64) -> FinancialProfile {
        FinancialProfile::new(UserType::Student)
            .with_income(income)
            .with_expenses(expenses)
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_savings_bands() {
        let synth = ReportSynthesizer::new();

        let excellent = synth.health_analysis(&profile(1000.0, 750.0));
        assert!(excellent[0].contains("Excellent savings rate: 25.0%"));

        let low = synth.health_analysis(&profile(1000.0, 920.0));
        assert!(low[0].contains("Low savings rate: 8.0%"));

        let negative = synth.health_analysis(&profile(1000.0, 1100.0));
        assert!(negative[0].contains("Negative savings: -10.0%"));
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(SavingsBand::classify(20.0), SavingsBand::Good);
        assert_eq!(SavingsBand::classify(10.0), SavingsBand::Low);
        assert_eq!(SavingsBand::classify(0.0), SavingsBand::Negative);
        assert_eq!(ExpenseBand::classify(80.0), ExpenseBand::Moderate);
        assert_eq!(ExpenseBand::classify(70.0), ExpenseBand::Healthy);
        assert_eq!(ExpenseBand::classify(92.0), ExpenseBand::High);
    }

    #[test]
    fn test_expense_ratio_lines() {
        let lines = ReportSynthesizer::new().health_analysis(&profile(1000.0, 920.0));
        assert_eq!(lines[1], "• Expense ratio: 92.0% of income");
        assert_eq!(lines[2], "• High expense ratio - requires immediate attention");
    }

    #[test]
    fn test_zero_income_is_insufficient_data() {
        let synth = ReportSynthesizer::new();
        let empty = FinancialProfile::default();

        let analysis = synth.health_analysis(&empty);
        assert_eq!(analysis, vec!["• Insufficient data for comprehensive analysis"]);

        let report = synth.synthesize(&profile(0.0, 0.0));
        assert!(report.body.contains("Insufficient data"));
        assert_eq!(report.source, ReportSource::LocalTemplate);
    }

    #[test]
    fn test_non_numeric_degrades_single_sections() {
        let synth = ReportSynthesizer::new();
        let p = FinancialProfile::new(UserType::Professional)
            .with_income("a lot")
            .with_expenses(500.0)
            .with_goal("House");

        let report = synth.synthesize_at(&p, fixed_time());
        assert!(report.body.contains("Unable to analyze due to invalid financial data"));
        assert!(report.body.contains("Ensure accurate financial data"));
        // Overview echoes the raw value, other sections still render
        assert!(report.body.contains("Monthly Income:     a lot"));
        assert!(report.body.contains("Net Savings:        N/A"));
        assert!(report.body.contains("1. Set up automatic savings transfer"));
        assert!(report.body.contains("6. Define specific monetary target"));
    }

    #[test]
    fn test_recommendations_by_user_type_and_goal() {
        let synth = ReportSynthesizer::new();

        let student = synth.recommendations(&profile(2000.0, 1500.0).with_goal_amount(1200.0));
        assert_eq!(student[0], "• Continue maintaining positive cash flow");
        assert!(student.iter().any(|l| l.contains("emergency fund")));
        assert_eq!(
            student.last().unwrap(),
            "• To reach your goal in 1 year, save $100.00 monthly"
        );

        let mut pro = profile(2000.0, 2500.0);
        pro.user_type = UserType::Professional;
        let pro = synth.recommendations(&pro);
        assert_eq!(pro[0], "• Urgent: Review and reduce monthly expenses");
        assert!(pro.iter().any(|l| l.contains("retirement contributions")));
        assert!(!pro.iter().any(|l| l.contains("To reach your goal")));
    }

    #[test]
    fn test_action_items_conditions() {
        let synth = ReportSynthesizer::new();

        let healthy = synth.action_items(&profile(3000.0, 1000.0));
        assert_eq!(healthy.len(), 5);

        let overspent = synth.action_items(&profile(1000.0, 1000.0).with_goal("Car"));
        assert_eq!(overspent.len(), 7);
        assert!(overspent[0].starts_with("PRIORITY:"));
        assert!(overspent[6].starts_with("6. Define"));

        let with_target = synth.action_items(&profile(3000.0, 1000.0).with_goal("Car").with_goal_amount(9000.0));
        assert_eq!(with_target.len(), 5);
    }

    #[test]
    fn test_missing_fields_render_placeholders() {
        let report = ReportSynthesizer::new().synthesize_at(&FinancialProfile::default(), fixed_time());
        assert!(report.body.contains("Monthly Income:     N/A"));
        assert!(report.body.contains("Primary Goal:       No goal specified"));
        assert!(report.body.contains("Target Amount:      N/A"));
        assert!(report.body.contains("Generated on: 2026-03-14 09:30:00 UTC"));
    }

    #[test]
    fn test_local_report_never_claims_a_model() {
        let report = ReportSynthesizer::new().synthesize(&profile(1000.0, 500.0));
        assert!(report.body.contains(LOCAL_GENERATOR));
        assert!(!report.source.is_remote());
    }

    proptest! {
        #[test]
        fn prop_synthesize_is_total(
            income in proptest::option::of(prop_oneof![
                any::<f64>().prop_map(crate::types::AmountInput::Number),
                "\\PC{0,12}".prop_map(crate::types::AmountInput::Text),
            ]),
            expenses in proptest::option::of(any::<f64>().prop_map(crate::types::AmountInput::Number)),
            goal in "\\PC{0,20}",
        ) {
            let p = FinancialProfile {
                user_type: UserType::Student,
                income,
                expenses,
                goal,
                goal_amount: None,
                chat_history: String::new(),
            };
            let report = ReportSynthesizer::new().synthesize_at(&p, fixed_time());
            prop_assert!(!report.body.is_empty());
            prop_assert!(report.body.contains("📋 ACTION ITEMS"));
        }

        #[test]
        fn prop_synthesize_is_idempotent(income in 0.0f64..1e7, expenses in 0.0f64..1e7) {
            let synth = ReportSynthesizer::new();
            let p = profile(income, expenses);
            prop_assert_eq!(synth.synthesize_at(&p, fixed_time()), synth.synthesize_at(&p, fixed_time()));
        }
    }
}
