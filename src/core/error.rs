//! Error taxonomy for the calculation core.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FinanceError {
    #[error("Invalid {field}: {value} ({reason})")]
    InvalidInput {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Rate solver did not converge after {iterations} iterations")]
    NoConvergence { iterations: u32 },

    #[error(
        "Goal of {goal:.2} not reached within {horizon_months} months (reached {reached:.2})"
    )]
    UnresolvedGoal {
        goal: f64,
        horizon_months: u32,
        reached: f64,
    },
}

/// Result type for calculation core operations
pub type Result<T> = std::result::Result<T, FinanceError>;

impl FinanceError {
    pub(crate) fn invalid(field: &'static str, value: f64, reason: &'static str) -> Self {
        FinanceError::InvalidInput {
            field,
            value,
            reason,
        }
    }
}

/// Rejects NaN, infinities and values below zero.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(FinanceError::invalid(field, value, "must be finite"));
    }
    if value < 0.0 {
        return Err(FinanceError::invalid(field, value, "must not be negative"));
    }
    Ok(value)
}

/// Fractions are expressed as 0.05 for 5%.
pub(crate) fn ensure_fraction(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(FinanceError::invalid(
            field,
            value,
            "must be between 0 and 1",
        ));
    }
    Ok(value)
}
