//! Calculation core: pure functions over primitive inputs, plus the
//! configuration and logging plumbing used by the command line.

pub mod breakdown;
pub mod config;
pub mod error;
pub mod log;
pub mod projection;
pub mod savings;
pub mod solver;
pub mod tax;

// Re-export main types for cleaner imports
pub use breakdown::{Amount, Breakdown, FinanceProfile, GoalPlan, ProjectionSettings};
pub use error::{FinanceError, Result};
pub use projection::{
    CompoundProjection, LinearProjection, RequiredReturn, compound_projection, future_value,
    linear_projection, monthly_rate, required_return_rate,
};
pub use savings::{
    FixedCost, Goal, GoalAllocation, allocate_goals, deduct_fixed_costs, savings_income,
};
pub use solver::{SolverConfig, irr};
pub use tax::{
    IncomeAfterTax, StudentLoanPlan, disposable_income, income_less_tax, ni_contribution,
    pension_contribution, student_loan_repayment,
};
