//! Core domain types: the caller-supplied financial profile.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Who the assistant is advising.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Student,
    Professional,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Student => "student",
            UserType::Professional => "professional",
        }
    }

    /// Capitalized form used in report headers ("Student").
    pub fn title(&self) -> &'static str {
        match self {
            UserType::Student => "Student",
            UserType::Professional => "Professional",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a [`UserType`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown user type '{0}' (expected 'student' or 'professional')")]
pub struct UnknownUserType(pub String);

impl FromStr for UserType {
    type Err = UnknownUserType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(UserType::Student),
            "professional" => Ok(UserType::Professional),
            _ => Err(UnknownUserType(s.to_string())),
        }
    }
}

/// Why an amount could not be used.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmountError {
    #[error("'{0}' is not a number")]
    NotNumeric(String),

    #[error("amount must not be negative: {0}")]
    Negative(f64),

    #[error("amount must be finite")]
    NotFinite,
}

/// A monetary amount exactly as the caller supplied it.
///
/// Callers (forms, JSON clients, saved sessions) may send either a number
/// or free text. The raw value is kept so it can be echoed and persisted
/// verbatim; [`AmountInput::value`] performs the checked conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    /// Parse into a non-negative, finite amount.
    ///
    /// Text is trimmed, a single leading `$` is stripped and `,` thousands
    /// separators are dropped before parsing.
    pub fn value(&self) -> Result<f64, AmountError> {
        let parsed = match self {
            AmountInput::Number(n) => *n,
            AmountInput::Text(raw) => {
                let trimmed = raw.trim();
                let unsigned = trimmed.strip_prefix('$').unwrap_or(trimmed);
                let cleaned: String = unsigned.chars().filter(|c| *c != ',').collect();
                cleaned
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| AmountError::NotNumeric(raw.clone()))?
            }
        };

        if !parsed.is_finite() {
            return Err(AmountError::NotFinite);
        }
        if parsed < 0.0 {
            return Err(AmountError::Negative(parsed));
        }
        Ok(parsed)
    }

    /// The value as the caller wrote it.
    pub fn raw(&self) -> String {
        match self {
            AmountInput::Number(n) => n.to_string(),
            AmountInput::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        AmountInput::Number(value)
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        AmountInput::Text(value.to_string())
    }
}

/// Resolve an optional amount, treating absence as zero.
pub fn amount_or_zero(input: Option<&AmountInput>) -> Result<f64, AmountError> {
    input.map_or(Ok(0.0), AmountInput::value)
}

/// The user's financial situation for a single request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FinancialProfile {
    #[serde(default)]
    pub user_type: UserType,

    /// Monthly income
    #[serde(default)]
    pub income: Option<AmountInput>,

    /// Monthly expenses
    #[serde(default)]
    pub expenses: Option<AmountInput>,

    /// Free-text goal ("Buy a car")
    #[serde(default)]
    pub goal: String,

    /// Target amount for the goal
    #[serde(default)]
    pub goal_amount: Option<AmountInput>,

    /// Conversation so far, as plain text
    #[serde(default)]
    pub chat_history: String,
}

impl FinancialProfile {
    pub fn new(user_type: UserType) -> Self {
        Self {
            user_type,
            ..Default::default()
        }
    }

    pub fn with_income(mut self, income: impl Into<AmountInput>) -> Self {
        self.income = Some(income.into());
        self
    }

    pub fn with_expenses(mut self, expenses: impl Into<AmountInput>) -> Self {
        self.expenses = Some(expenses.into());
        self
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    pub fn with_goal_amount(mut self, amount: impl Into<AmountInput>) -> Self {
        self.goal_amount = Some(amount.into());
        self
    }

    pub fn with_chat_history(mut self, history: impl Into<String>) -> Self {
        self.chat_history = history.into();
        self
    }

    /// Income and expenses, absent values counted as zero.
    pub fn cash_flow(&self) -> Result<(f64, f64), AmountError> {
        let income = amount_or_zero(self.income.as_ref())?;
        let expenses = amount_or_zero(self.expenses.as_ref())?;
        Ok((income, expenses))
    }

    /// Whether the user named a goal.
    pub fn has_goal(&self) -> bool {
        !self.goal.trim().is_empty()
    }

    /// Goal amount, if one was given, parses, and is above zero.
    pub fn goal_target(&self) -> Option<f64> {
        self.goal_amount
            .as_ref()
            .and_then(|a| a.value().ok())
            .filter(|v| *v > 0.0)
    }
}
