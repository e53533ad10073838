//! Number formatting shared by reports and the planner.

use crate::types::AmountInput;

/// Format a currency value: `$1,234.56`, negatives as `-$1,234.56`.
pub fn currency(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (whole, cents) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // -0.004 rounds to "0.00"; don't print "-$0.00"
    let sign = if value < 0.0 && rounded != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

/// Format a percentage with one decimal place: `25.0%`.
pub fn percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Render a caller-supplied amount for display.
///
/// Numeric input is shown as currency, anything else verbatim, and a
/// missing value as `fallback`.
pub fn display_amount(input: Option<&AmountInput>, fallback: &str) -> String {
    match input {
        None => fallback.to_string(),
        Some(amount) => match amount.value() {
            Ok(v) => currency(v),
            Err(_) => amount.raw(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_grouping() {
        assert_eq!(currency(0.0), "$0.00");
        assert_eq!(currency(999.999), "$1,000.00");
        assert_eq!(currency(1234.5), "$1,234.50");
        assert_eq!(currency(1234567.891), "$1,234,567.89");
        assert_eq!(currency(-250.0), "-$250.00");
        assert_eq!(currency(-0.001), "$0.00");
    }

    #[test]
    fn test_percent_one_decimal() {
        assert_eq!(percent(25.0), "25.0%");
        assert_eq!(percent(-10.0), "-10.0%");
        assert_eq!(percent(8.04), "8.0%");
    }

    #[test]
    fn test_display_amount() {
        assert_eq!(display_amount(None, "N/A"), "N/A");
        assert_eq!(display_amount(Some(&AmountInput::Number(50.0)), "N/A"), "$50.00");
        assert_eq!(
            display_amount(Some(&AmountInput::from("about 3k")), "N/A"),
            "about 3k"
        );
    }
}
