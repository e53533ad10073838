//! Planner endpoints: quick answers that never touch a model.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use finbot_core::types::amount_or_zero;
use finbot_core::{planner, AmountInput, GoalPlan, DEFAULT_GOAL_MONTHS};

use super::ApiError;

#[derive(Debug, Deserialize)]
pub struct CashFlowRequest {
    #[serde(default)]
    pub income: Option<AmountInput>,
    #[serde(default)]
    pub expenses: Option<AmountInput>,
}

impl CashFlowRequest {
    fn amounts(&self) -> Result<(f64, f64), ApiError> {
        Ok((
            amount_or_zero(self.income.as_ref())?,
            amount_or_zero(self.expenses.as_ref())?,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    #[serde(default)]
    pub goal_amount: Option<AmountInput>,
    #[serde(default)]
    pub income: Option<AmountInput>,
    #[serde(default)]
    pub expenses: Option<AmountInput>,
    #[serde(default)]
    pub months: Option<i64>,
}

/// POST /budget-summary
pub async fn budget_summary(
    req: Result<Json<CashFlowRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = req?;
    let (income, expenses) = req.amounts()?;
    Ok(Json(json!({ "summary": planner::budget_summary(income, expenses) })))
}

/// POST /goal-calculation
pub async fn goal_calculation(
    req: Result<Json<GoalRequest>, JsonRejection>,
) -> Result<Json<GoalPlan>, ApiError> {
    let Json(req) = req?;
    let goal_amount = amount_or_zero(req.goal_amount.as_ref())?;
    let income = amount_or_zero(req.income.as_ref())?;
    let expenses = amount_or_zero(req.expenses.as_ref())?;
    let months = req.months.unwrap_or(DEFAULT_GOAL_MONTHS);
    Ok(Json(planner::goal_plan(goal_amount, income, expenses, months)))
}

/// POST /spending-insights
pub async fn spending_insights(
    req: Result<Json<CashFlowRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = req?;
    let (income, expenses) = req.amounts()?;
    Ok(Json(json!({ "insights": planner::spending_insights(income, expenses) })))
}
