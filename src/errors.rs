use std::result::Result as StdResult;

use thiserror::Error;

/// Error type shared by the budget engine, loaders and report writers.
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("Invalid {field} `{value}`: {reason}")]
    Validation {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("Invalid {field}: expected {expected}, found {found}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("Frequency `{expression}` is neither a date nor a recurrence sentence")]
    RecurrenceResolution { expression: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, BudgetError>;

impl BudgetError {
    pub fn validation(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        BudgetError::Validation {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn type_mismatch(
        field: &'static str,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        BudgetError::TypeMismatch {
            field,
            expected,
            found: found.into(),
        }
    }

    /// Raw value the error was raised for, when there is one.
    pub fn offending_value(&self) -> Option<&str> {
        match self {
            BudgetError::Validation { value, .. } => Some(value),
            BudgetError::TypeMismatch { found, .. } => Some(found),
            BudgetError::RecurrenceResolution { expression } => Some(expression),
            _ => None,
        }
    }
}
