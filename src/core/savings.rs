//! Fixed costs, savings income and the split of savings across goals.
use super::error::{FinanceError, Result, ensure_fraction, ensure_non_negative};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A recurring monthly outgoing such as rent.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FixedCost {
    pub name: String,
    pub amount: f64,
}

impl FixedCost {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        FixedCost {
            name: name.into(),
            amount,
        }
    }
}

/// Something being saved for, with the share of savings it receives.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Goal {
    pub name: String,
    pub allocation: f64,
    pub target: Option<f64>,
}

impl Goal {
    pub fn new(name: impl Into<String>, allocation: f64, target: Option<f64>) -> Self {
        Goal {
            name: name.into(),
            allocation,
            target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalAllocation {
    pub name: String,
    pub allocation: f64,
    pub amount: f64,
    pub target: Option<f64>,
}

/// Allocations may add up to a little over 1 through float noise.
const ALLOCATION_SLACK: f64 = 1e-9;

/// Subtracts the fixed costs, in order, from `disposable`. Both must be in
/// the same period. A negative result means costs exceed income.
pub fn deduct_fixed_costs(disposable: f64, fixed_costs: &[FixedCost]) -> Result<f64> {
    if !disposable.is_finite() {
        return Err(FinanceError::invalid(
            "disposable_income",
            disposable,
            "must be finite",
        ));
    }

    let mut total = 0.0;
    for cost in fixed_costs {
        total += ensure_non_negative("fixed_cost", cost.amount)?;
    }
    debug!(
        "deducting {} fixed costs totalling {total} from {disposable}",
        fixed_costs.len()
    );
    Ok(disposable - total)
}

pub fn savings_income(personal: f64, fraction: f64) -> Result<f64> {
    if !personal.is_finite() {
        return Err(FinanceError::invalid(
            "personal_income",
            personal,
            "must be finite",
        ));
    }
    let fraction = ensure_fraction("savings_fraction", fraction)?;
    Ok(personal * fraction)
}

/// Splits `savings` across `goals` by their allocation fractions.
pub fn allocate_goals(savings: f64, goals: &[Goal]) -> Result<Vec<GoalAllocation>> {
    if !savings.is_finite() {
        return Err(FinanceError::invalid("savings", savings, "must be finite"));
    }

    let mut total_allocation = 0.0;
    for goal in goals {
        total_allocation += ensure_fraction("goal_allocation", goal.allocation)?;
        if let Some(target) = goal.target {
            ensure_non_negative("goal_target", target)?;
        }
    }
    if total_allocation > 1.0 + ALLOCATION_SLACK {
        return Err(FinanceError::invalid(
            "goal_allocation",
            total_allocation,
            "goal allocations must not add up to more than 1",
        ));
    }

    Ok(goals
        .iter()
        .map(|goal| GoalAllocation {
            name: goal.name.clone(),
            allocation: goal.allocation,
            amount: savings * goal.allocation,
            target: goal.target,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deducts_all_fixed_costs() {
        let costs = vec![FixedCost::new("Rent", 800.0), FixedCost::new("Bills", 150.5)];
        assert_eq!(deduct_fixed_costs(2_000.0, &costs).unwrap(), 1_049.5);
    }

    #[test]
    fn no_fixed_costs_leaves_income_untouched() {
        assert_eq!(deduct_fixed_costs(1_234.0, &[]).unwrap(), 1_234.0);
    }

    #[test]
    fn fixed_costs_can_exceed_income() {
        let costs = vec![FixedCost::new("Rent", 1_500.0)];
        assert_eq!(deduct_fixed_costs(1_000.0, &costs).unwrap(), -500.0);
    }

    #[test]
    fn rejects_negative_fixed_cost() {
        let costs = vec![FixedCost::new("Refund", -10.0)];
        assert!(matches!(
            deduct_fixed_costs(1_000.0, &costs),
            Err(FinanceError::InvalidInput { field: "fixed_cost", .. })
        ));
    }

    #[test]
    fn savings_income_is_a_fraction_of_personal_income() {
        assert_eq!(savings_income(1_000.0, 0.25).unwrap(), 250.0);
        assert_eq!(savings_income(1_000.0, 0.0).unwrap(), 0.0);
        assert!(savings_income(1_000.0, 1.25).is_err());
    }

    #[test]
    fn allocates_goals_in_order() {
        let goals = vec![
            Goal::new("Holiday", 0.25, Some(1_200.0)),
            Goal::new("Emergency fund", 0.75, None),
        ];
        let allocations = allocate_goals(400.0, &goals).unwrap();

        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].name, "Holiday");
        assert_eq!(allocations[0].amount, 100.0);
        assert_eq!(allocations[0].target, Some(1_200.0));
        assert_eq!(allocations[1].name, "Emergency fund");
        assert_eq!(allocations[1].amount, 300.0);
        let total: f64 = allocations.iter().map(|a| a.amount).sum();
        assert_eq!(total, 400.0);
    }

    #[test]
    fn rejects_over_allocated_goals() {
        let goals = vec![Goal::new("A", 0.6, None), Goal::new("B", 0.6, None)];
        assert!(allocate_goals(400.0, &goals).is_err());
    }

    #[test]
    fn tolerates_float_noise_in_allocations() {
        let goals = vec![
            Goal::new("A", 0.1, None),
            Goal::new("B", 0.2, None),
            Goal::new("C", 0.7, None),
        ];
        assert!(allocate_goals(400.0, &goals).is_ok());
    }

    #[test]
    fn rejects_negative_goal_target() {
        let goals = vec![Goal::new("A", 0.5, Some(-1.0))];
        assert!(allocate_goals(400.0, &goals).is_err());
    }
}
