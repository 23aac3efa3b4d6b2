use std::{fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use tracing::{debug, warn};

use super::breakdown::{CUMULATIVE_TOTAL_COLUMN, DAILY_TOTAL_COLUMN, DATE_COLUMN};
use crate::errors::{BudgetError, Result};

/// Column names the breakdown and its reports emit themselves.
const RESERVED_DESCRIPTIONS: &[&str] =
    &[DATE_COLUMN, DAILY_TOTAL_COLUMN, CUMULATIVE_TOTAL_COLUMN];

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Raw amount as it arrives from callers or definition files.
#[derive(Debug, Clone, PartialEq)]
pub enum AmountInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for AmountInput {
    fn from(value: i64) -> Self {
        AmountInput::Integer(value)
    }
}

impl From<i32> for AmountInput {
    fn from(value: i32) -> Self {
        AmountInput::Integer(value as i64)
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        AmountInput::Float(value)
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        AmountInput::Text(value.to_string())
    }
}

impl From<String> for AmountInput {
    fn from(value: String) -> Self {
        AmountInput::Text(value)
    }
}

impl fmt::Display for AmountInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountInput::Integer(value) => write!(f, "{value}"),
            AmountInput::Float(value) => write!(f, "{value}"),
            AmountInput::Text(value) => f.write_str(value),
        }
    }
}

/// Collapses whitespace runs to single spaces and trims; empty results fail.
pub fn normalize_text(field: &'static str, value: &str) -> Result<String> {
    let normalized = WHITESPACE.replace_all(value, " ").trim().to_string();
    if normalized.is_empty() {
        warn!(field, "rejected empty text");
        return Err(BudgetError::validation(field, value, "must not be empty"));
    }
    Ok(normalized)
}

/// Parses an amount to whole units, rounding half away from zero on the exact
/// decimal digits.
pub fn parse_amount(value: impl Into<AmountInput>) -> Result<i64> {
    let input = value.into();
    let text = match &input {
        AmountInput::Integer(value) => return Ok(*value),
        AmountInput::Float(value) if !value.is_finite() => {
            return Err(BudgetError::validation(
                "amount",
                input.to_string(),
                "must be a finite number",
            ))
        }
        // shortest round-trip rendering, so 1.495 stays 1.495
        AmountInput::Float(value) => value.to_string(),
        AmountInput::Text(value) => normalize_text("amount", value)?,
    };
    let decimal = parse_decimal(&text).ok_or_else(|| {
        warn!(amount = %input, "rejected unparsable amount");
        BudgetError::validation("amount", input.to_string(), "not a decimal number")
    })?;
    decimal
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| BudgetError::validation("amount", input.to_string(), "out of range"))
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.contains(['e', 'E']) {
        Decimal::from_scientific(text).ok()
    } else {
        Decimal::from_str(text).ok()
    }
}

/// One recurring budget item: what it is, how much, and how often.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventRecord {
    description: String,
    amount: i64,
    frequency: String,
}

impl EventRecord {
    pub fn new(
        description: &str,
        amount: impl Into<AmountInput>,
        frequency: &str,
    ) -> Result<Self> {
        let amount = amount.into();
        debug!(description, %amount, frequency, "creating event record");
        let description = normalize_text("description", description)?;
        if RESERVED_DESCRIPTIONS
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(&description))
        {
            warn!(description = description.as_str(), "rejected reserved description");
            return Err(BudgetError::validation(
                "description",
                description,
                "is a reserved report column name",
            ));
        }
        let record = Self {
            description,
            amount: parse_amount(amount)?,
            frequency: normalize_text("frequency", frequency)?,
        };
        debug!(record = %record, "created event record");
        Ok(record)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn frequency(&self) -> &str {
        &self.frequency
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.description, self.amount, self.frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_whitespace() {
        let record = EventRecord::new("  weekly \t food\n", 10, " every   week ").unwrap();
        assert_eq!(record.description(), "weekly food");
        assert_eq!(record.frequency(), "every week");

        for raw in [
            "rent",
            "\tcar\t\tloan ",
            "gym\n\nmembership\r\n",
            " \u{a0}coffee \t \n beans\u{2003}",
            "a  b   c\t\td",
        ] {
            let text = normalize_text("description", raw).unwrap();
            assert!(!text.is_empty(), "{raw:?}");
            assert_eq!(text, text.trim(), "{raw:?}");
            assert!(!text.contains("  "), "{raw:?}");
            assert!(!text.contains(['\t', '\n', '\r']), "{raw:?}");
        }
    }

    #[test]
    fn rejects_reserved_column_names() {
        for description in ["date", "DAILY_TOTAL", " Cumulative_Total "] {
            let err = EventRecord::new(description, 1, "every day").unwrap_err();
            assert!(
                matches!(err, BudgetError::Validation { field: "description", .. }),
                "{description}: {err}"
            );
        }
        assert!(EventRecord::new("date night", 1, "every day").is_ok());
    }

    #[test]
    fn rejects_blank_fields() {
        let err = EventRecord::new(" \n ", 1, "every day").unwrap_err();
        assert!(matches!(
            err,
            BudgetError::Validation {
                field: "description",
                ..
            }
        ));
        let err = EventRecord::new("rent", 1, "").unwrap_err();
        assert!(matches!(
            err,
            BudgetError::Validation {
                field: "frequency",
                ..
            }
        ));
    }

    #[test]
    fn rounds_half_up_on_exact_digits() {
        assert_eq!(parse_amount("1.50").unwrap(), 2);
        assert_eq!(parse_amount("1.49").unwrap(), 1);
        assert_eq!(parse_amount("1.495").unwrap(), 1);
        assert_eq!(parse_amount("-2.5").unwrap(), -3);
        assert_eq!(parse_amount(" 200 ").unwrap(), 200);
        assert_eq!(parse_amount("1.5e2").unwrap(), 150);
    }

    #[test]
    fn floats_round_from_their_decimal_text() {
        assert_eq!(parse_amount(1.495).unwrap(), 1);
        assert_eq!(parse_amount(2.5).unwrap(), 3);
        assert_eq!(parse_amount(-0.4).unwrap(), 0);
        assert!(parse_amount(f64::NAN).is_err());
    }

    #[test]
    fn integers_pass_through() {
        assert_eq!(parse_amount(-5).unwrap(), -5);
        assert_eq!(parse_amount(i64::MIN).unwrap(), i64::MIN);
    }

    #[test]
    fn unparsable_amount_keeps_raw_value() {
        let err = parse_amount("twelve").unwrap_err();
        assert_eq!(err.offending_value(), Some("twelve"));
        assert!(parse_amount("1e40").is_err());
    }
}
