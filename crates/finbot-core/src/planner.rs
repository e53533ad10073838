//! Quick budgeting answers that need no model: budget summary, goal
//! savings plan and spending insights.

use serde::{Deserialize, Serialize};

use crate::format::currency;

/// Months used when the caller does not give a goal horizon.
pub const DEFAULT_GOAL_MONTHS: i64 = 12;

/// Spending above this share of income triggers a warning.
const SPENDING_WARNING_RATIO: f64 = 0.7;

/// One-sentence verdict on monthly cash flow.
pub fn budget_summary(income: f64, expenses: f64) -> String {
    let savings = income - expenses;
    if savings < 0.0 {
        format!(
            "Your expenses exceed your income by {}. Consider reducing discretionary spending.",
            currency(-savings)
        )
    } else if savings == 0.0 {
        "You are breaking even. Try to save a small amount each month for emergencies.".to_string()
    } else {
        format!(
            "You are saving {} per month. Great job! Consider allocating some to your financial goals.",
            currency(savings)
        )
    }
}

/// How much to set aside each month to reach a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPlan {
    pub monthly_amount: f64,
    pub available: f64,
    pub achievable: bool,
    pub message: String,
}

/// Plan monthly savings for `goal_amount` over `months`.
///
/// A non-positive horizon means the whole amount is needed now.
pub fn goal_plan(goal_amount: f64, income: f64, expenses: f64, months: i64) -> GoalPlan {
    let available = (income - expenses).max(0.0);
    let monthly_amount = if months > 0 {
        goal_amount / months as f64
    } else {
        goal_amount
    };

    let achievable = available >= monthly_amount;
    let message = if achievable {
        format!(
            "You need to save {} per month to reach your goal. You have enough available!",
            currency(monthly_amount)
        )
    } else {
        format!(
            "You need to save {} per month, but only {} is available. Consider extending your timeline or reducing expenses.",
            currency(monthly_amount),
            currency(available)
        )
    };

    GoalPlan {
        monthly_amount,
        available,
        achievable,
        message,
    }
}

/// Flag spending that eats most of the income.
pub fn spending_insights(income: f64, expenses: f64) -> String {
    if income > 0.0 && expenses / income > SPENDING_WARNING_RATIO {
        "Your spending is more than 70% of your income. Review subscriptions, eating out, and impulse purchases.".to_string()
    } else {
        "Your spending is within a healthy range. Keep tracking for overlooked expenses like small subscriptions or fees.".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_summary_branches() {
        assert!(budget_summary(1000.0, 1250.0).contains("exceed your income by $250.00"));
        assert!(budget_summary(1000.0, 1000.0).contains("breaking even"));
        assert!(budget_summary(1000.0, 600.0).contains("saving $400.00 per month"));
    }

    #[test]
    fn test_goal_plan_shortfall() {
        let plan = goal_plan(12000.0, 3000.0, 2500.0, 12);
        assert_eq!(plan.monthly_amount, 1000.0);
        assert_eq!(plan.available, 500.0);
        assert!(!plan.achievable);
        assert!(plan.message.contains("only $500.00 is available"));
    }

    #[test]
    fn test_goal_plan_achievable_and_zero_months() {
        let plan = goal_plan(600.0, 3000.0, 2000.0, DEFAULT_GOAL_MONTHS);
        assert!(plan.achievable);
        assert_eq!(plan.monthly_amount, 50.0);

        let now = goal_plan(600.0, 3000.0, 2000.0, 0);
        assert_eq!(now.monthly_amount, 600.0);
    }

    #[test]
    fn test_spending_insights_threshold() {
        assert!(spending_insights(1000.0, 710.0).contains("more than 70%"));
        assert!(spending_insights(1000.0, 700.0).contains("healthy range"));
        assert!(spending_insights(0.0, 500.0).contains("healthy range"));
    }
}
