//! Savings goal projections: straight-line saving, compound growth, and the
//! return needed to reach a target in a fixed number of months.
use super::error::{FinanceError, Result, ensure_non_negative};
use super::solver::{SolverConfig, irr};
use rust_decimal::{Decimal, prelude::*};
use rust_finprim::{rate::cagr, tvm::fv};
use serde::Serialize;
use tracing::debug;

/// Projections longer than this are rejected.
pub const MAX_PROJECTION_MONTHS: u32 = 12 * 1_000;

/// Future values beyond this are out of `Decimal`'s reach.
const MAX_FUTURE_VALUE: f64 = 1e26;

/// Ratios this close to a whole number of months count as that number.
const WHOLE_MONTH_SLACK: f64 = 1e-9;

/// Cumulative balance after each monthly payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearProjection {
    pub balances: Vec<f64>,
    pub months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompoundProjection {
    pub balances: Vec<f64>,
    pub months: u32,
    /// First month, counting from 1, whose balance reaches the goal.
    pub goal_month: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RequiredReturn {
    pub monthly_rate: f64,
    pub annual_rate: f64,
}

/// Checks a projection horizon is between one month and 1000 years.
pub fn ensure_horizon(horizon_months: u32) -> Result<u32> {
    if horizon_months == 0 {
        return Err(FinanceError::invalid(
            "horizon_months",
            0.0,
            "must be at least one month",
        ));
    }
    if horizon_months > MAX_PROJECTION_MONTHS {
        return Err(FinanceError::invalid(
            "horizon_months",
            f64::from(horizon_months),
            "must not exceed 1000 years",
        ));
    }
    Ok(horizon_months)
}

fn ensure_positive_payment(monthly_payment: f64) -> Result<f64> {
    let payment = ensure_non_negative("monthly_payment", monthly_payment)?;
    if payment == 0.0 {
        return Err(FinanceError::invalid(
            "monthly_payment",
            payment,
            "must be greater than zero",
        ));
    }
    Ok(payment)
}

/// Saves `monthly_payment` every month until the balance reaches `goal`.
pub fn linear_projection(goal: f64, monthly_payment: f64) -> Result<LinearProjection> {
    let goal = ensure_non_negative("goal", goal)?;
    let payment = ensure_positive_payment(monthly_payment)?;

    let ratio = goal / payment;
    let whole = ratio.round();
    let months = if (ratio - whole).abs() < WHOLE_MONTH_SLACK {
        whole
    } else {
        ratio.ceil()
    };
    if months > f64::from(MAX_PROJECTION_MONTHS) {
        return Err(FinanceError::invalid(
            "goal",
            goal,
            "takes longer than 1000 years at this payment",
        ));
    }

    let months = months as u32;
    let balances = (1..=months).map(|m| payment * f64::from(m)).collect();
    debug!("linear projection to {goal} at {payment}/month: {months} months");
    Ok(LinearProjection { balances, months })
}

/// Converts an annual rate into the equivalent monthly compounding rate,
/// `(1 + annual)^(1/12) - 1`.
pub fn monthly_rate(annual_interest: f64) -> Result<f64> {
    if !annual_interest.is_finite() || annual_interest <= -1.0 {
        return Err(FinanceError::invalid(
            "annual_interest",
            annual_interest,
            "must be a finite rate above -100%",
        ));
    }
    if annual_interest == 0.0 {
        return Ok(0.0);
    }

    let growth = Decimal::from_f64(1.0 + annual_interest).ok_or_else(|| {
        FinanceError::invalid("annual_interest", annual_interest, "not representable")
    })?;
    cagr(Decimal::ONE, growth, Decimal::from(12))
        .to_f64()
        .ok_or_else(|| {
            FinanceError::invalid("annual_interest", annual_interest, "not representable")
        })
}

/// Grows monthly payments at the compounded monthly equivalent of
/// `annual_interest` over `horizon_months`, and finds the first month the
/// balance reaches `goal`.
///
/// The whole horizon is always projected. A horizon that ends before the goal
/// is reached is an [`FinanceError::UnresolvedGoal`].
pub fn compound_projection(
    monthly_payment: f64,
    annual_interest: f64,
    goal: f64,
    horizon_months: u32,
) -> Result<CompoundProjection> {
    let payment = ensure_non_negative("monthly_payment", monthly_payment)?;
    let goal = ensure_non_negative("goal", goal)?;
    ensure_horizon(horizon_months)?;
    let growth = 1.0 + monthly_rate(annual_interest)?;

    let mut balances = Vec::with_capacity(horizon_months as usize);
    let mut balance = payment;
    let mut factor = 1.0;
    balances.push(balance);
    let mut goal_month = (balance >= goal).then_some(1);

    for month in 1..horizon_months {
        factor *= growth;
        balance += payment * factor;
        balances.push(balance);
        if goal_month.is_none() && balance >= goal {
            goal_month = Some(month + 1);
        }
    }

    match goal_month {
        Some(goal_month) => {
            debug!(
                "compound projection reaches {goal} in month {goal_month} of {horizon_months}"
            );
            Ok(CompoundProjection {
                balances,
                months: horizon_months,
                goal_month,
            })
        }
        None => Err(FinanceError::UnresolvedGoal {
            goal,
            horizon_months,
            reached: balance,
        }),
    }
}

/// Value at the withdrawal date of `months` payments made at the start of
/// each month and growing at `monthly_rate`.
pub fn future_value(monthly_payment: f64, monthly_rate: f64, months: u32) -> Result<f64> {
    if !monthly_payment.is_finite() {
        return Err(FinanceError::invalid(
            "monthly_payment",
            monthly_payment,
            "must be finite",
        ));
    }
    if !monthly_rate.is_finite() || monthly_rate <= -1.0 {
        return Err(FinanceError::invalid(
            "monthly_rate",
            monthly_rate,
            "must be a finite rate above -100%",
        ));
    }
    let growth = (1.0 + monthly_rate).powf(f64::from(months)).max(1.0);
    if monthly_payment.abs() * f64::from(months) * growth > MAX_FUTURE_VALUE {
        return Err(FinanceError::invalid(
            "months",
            f64::from(months),
            "grows the balance beyond the representable range",
        ));
    }

    let not_representable =
        || FinanceError::invalid("monthly_rate", monthly_rate, "not representable");
    let rate = Decimal::from_f64(monthly_rate).ok_or_else(not_representable)?;
    if rate.is_zero() {
        return Ok(monthly_payment * f64::from(months));
    }
    // Payments enter fv as outflows
    let payment = Decimal::from_f64(-monthly_payment).ok_or_else(|| {
        FinanceError::invalid("monthly_payment", monthly_payment, "not representable")
    })?;
    fv(rate, Decimal::from(months), payment, None, Some(true))
        .to_f64()
        .ok_or_else(not_representable)
}

/// Finds the monthly and annual return that turns `months` payments of
/// `monthly_payment` into `target` one month after the last payment.
pub fn required_return_rate(
    monthly_payment: f64,
    target: f64,
    months: u32,
    config: &SolverConfig,
) -> Result<RequiredReturn> {
    let months = ensure_horizon(months)?;
    let mut cash_flows = vec![monthly_payment; months as usize];
    cash_flows.push(-target);

    let monthly_rate = irr(&cash_flows, config)?;
    let annual_rate = (1.0 + monthly_rate).powi(12) - 1.0;
    debug!(
        "required return for {target} from {months} x {monthly_payment}: {monthly_rate} monthly, {annual_rate} annual"
    );
    Ok(RequiredReturn {
        monthly_rate,
        annual_rate,
    })
}
