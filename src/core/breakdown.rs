//! Builds the full picture for one person: annual and monthly deductions,
//! the monthly budget after fixed costs, and how savings are split.
use super::error::{FinanceError, Result};
use super::projection::{compound_projection, linear_projection};
use super::savings::{
    FixedCost, Goal, GoalAllocation, allocate_goals, deduct_fixed_costs, savings_income,
};
use super::tax::{
    StudentLoanPlan, income_less_tax, ni_contribution, pension_contribution,
    student_loan_repayment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Everything needed to compute a breakdown.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FinanceProfile {
    pub gross_salary: f64,
    #[serde(default)]
    pub student_loan_plan: StudentLoanPlan,
    #[serde(default)]
    pub pension_fraction: f64,
    #[serde(default)]
    pub fixed_costs: Vec<FixedCost>,
    #[serde(default)]
    pub savings_fraction: f64,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

/// How goal projections grow savings.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ProjectionSettings {
    /// Yearly return on savings, 0.04 for 4%. Zero disables compound projections.
    pub annual_interest: f64,
    pub horizon_months: u32,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        ProjectionSettings {
            annual_interest: 0.0,
            horizon_months: 600,
        }
    }
}

/// One deduction line, as a yearly and a monthly figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Amount {
    pub annual: f64,
    pub monthly: f64,
}

impl Amount {
    fn from_annual(annual: f64) -> Self {
        Amount {
            annual,
            monthly: annual / 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub gross: Amount,
    pub income_tax: Amount,
    pub national_insurance: Amount,
    pub student_loan: Amount,
    pub pension: Amount,
    pub disposable: Amount,
    // Monthly budget from here on
    pub fixed_costs: f64,
    pub personal: f64,
    pub savings: f64,
    pub spending: f64,
    pub goals: Vec<GoalAllocation>,
}

/// Projection of a single goal that has a target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalPlan {
    pub name: String,
    pub target: f64,
    pub monthly_payment: f64,
    /// Months to target saving without growth, or why it takes too long;
    /// `None` when nothing is paid in.
    pub linear_months: Option<std::result::Result<u32, String>>,
    /// Month the target is reached with growth, or why it is not.
    pub compound: Option<std::result::Result<u32, String>>,
}

impl Breakdown {
    pub fn from_profile(profile: &FinanceProfile) -> Result<Self> {
        let gross = profile.gross_salary;
        debug!("Computing breakdown for gross salary {gross}");

        let after_tax = income_less_tax(gross)?;
        let ni = ni_contribution(gross)?;
        let loan = student_loan_repayment(gross, profile.student_loan_plan)?;
        let pension = pension_contribution(gross, profile.pension_fraction)?;
        let disposable = after_tax.net - ni - loan - pension;

        let monthly_disposable = disposable / 12.0;
        let personal = deduct_fixed_costs(monthly_disposable, &profile.fixed_costs)?;
        let fixed_costs = profile.fixed_costs.iter().map(|cost| cost.amount).sum::<f64>();
        // Nothing to save once fixed costs eat all income
        let savings = savings_income(personal.max(0.0), profile.savings_fraction)?;
        let goals = allocate_goals(savings, &profile.goals)?;

        Ok(Breakdown {
            gross: Amount::from_annual(gross),
            income_tax: Amount::from_annual(after_tax.tax),
            national_insurance: Amount::from_annual(ni),
            student_loan: Amount::from_annual(loan),
            pension: Amount::from_annual(pension),
            disposable: Amount::from_annual(disposable),
            fixed_costs,
            personal,
            savings,
            spending: personal - savings,
            goals,
        })
    }

    /// Projects every goal that has a target using its monthly allocation.
    pub fn goal_plans(&self, settings: &ProjectionSettings) -> Vec<GoalPlan> {
        self.goals
            .iter()
            .filter_map(|goal| {
                let target = goal.target?;
                let payment = goal.amount;

                let linear_months = (payment > 0.0).then(|| {
                    linear_projection(target, payment)
                        .map(|projection| projection.months)
                        .map_err(|e| describe_projection_error(&e))
                });

                let compound = (settings.annual_interest != 0.0).then(|| {
                    compound_projection(
                        payment,
                        settings.annual_interest,
                        target,
                        settings.horizon_months,
                    )
                    .map(|projection| projection.goal_month)
                    .map_err(|e| describe_projection_error(&e))
                });

                Some(GoalPlan {
                    name: goal.name.clone(),
                    target,
                    monthly_payment: payment,
                    linear_months,
                    compound,
                })
            })
            .collect()
    }
}

fn describe_projection_error(error: &FinanceError) -> String {
    match error {
        FinanceError::UnresolvedGoal { horizon_months, .. } => {
            format!("not reached within {horizon_months} months")
        }
        FinanceError::InvalidInput { field: "goal", .. } => {
            "takes longer than 1000 years".to_string()
        }
        other => other.to_string(),
    }
}
