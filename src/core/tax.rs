//! UK income tax, national insurance, student loan and pension deductions.
//!
//! All figures are annual and every deduction is computed on gross pay.
use super::error::{FinanceError, Result, ensure_fraction, ensure_non_negative};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const PERSONAL_ALLOWANCE: f64 = 12_570.0;
pub const BASIC_RATE_CEILING: f64 = 50_270.0;
pub const ADDITIONAL_RATE_THRESHOLD: f64 = 150_000.0;

/// Share of each band's income kept after tax.
pub const BASIC_RATE_RETAINED: f64 = 0.8;
pub const HIGHER_RATE_RETAINED: f64 = 0.6;
pub const ADDITIONAL_RATE_RETAINED: f64 = 0.55;

pub const NI_PRIMARY_MONTHLY_THRESHOLD: f64 = 823.0;
pub const NI_MAIN_RATE: f64 = 0.1325;
pub const NI_UPPER_RATE: f64 = 0.0325;

pub const PLAN_1_MONTHLY_THRESHOLD: f64 = 1_682.0;
pub const PLAN_2_MONTHLY_THRESHOLD: f64 = 2_274.0;
pub const STUDENT_LOAN_RATE: f64 = 0.09;

/// Largest gross salary accepted by the calculator.
pub const MAX_GROSS_SALARY: f64 = 26_500_000_000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentLoanPlan {
    #[default]
    None,
    #[serde(alias = "plan_1")]
    Plan1,
    #[serde(alias = "plan_2")]
    Plan2,
}

impl StudentLoanPlan {
    /// Annual repayment threshold, `None` when there is nothing to repay.
    pub fn annual_threshold(&self) -> Option<f64> {
        match self {
            StudentLoanPlan::None => None,
            StudentLoanPlan::Plan1 => Some(12.0 * PLAN_1_MONTHLY_THRESHOLD),
            StudentLoanPlan::Plan2 => Some(12.0 * PLAN_2_MONTHLY_THRESHOLD),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StudentLoanPlan::None => "None",
            StudentLoanPlan::Plan1 => "Plan 1",
            StudentLoanPlan::Plan2 => "Plan 2",
        }
    }
}

impl TryFrom<u8> for StudentLoanPlan {
    type Error = FinanceError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(StudentLoanPlan::None),
            1 => Ok(StudentLoanPlan::Plan1),
            2 => Ok(StudentLoanPlan::Plan2),
            _ => Err(FinanceError::invalid(
                "student_loan_plan",
                f64::from(code),
                "expected 0, 1 or 2",
            )),
        }
    }
}

/// Income left after income tax, and the tax paid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IncomeAfterTax {
    pub net: f64,
    pub tax: f64,
}

pub(crate) fn validate_gross(gross: f64) -> Result<f64> {
    let gross = ensure_non_negative("gross_salary", gross)?;
    if gross > MAX_GROSS_SALARY {
        return Err(FinanceError::invalid(
            "gross_salary",
            gross,
            "exceeds the largest supported salary",
        ));
    }
    Ok(gross)
}

/// Applies the marginal bands to `gross`, keeping a fixed fraction of the
/// income that falls in each band.
pub fn income_less_tax(gross: f64) -> Result<IncomeAfterTax> {
    let gross = validate_gross(gross)?;
    if gross <= PERSONAL_ALLOWANCE {
        return Ok(IncomeAfterTax {
            net: gross,
            tax: 0.0,
        });
    }

    let bands = [
        (PERSONAL_ALLOWANCE, BASIC_RATE_CEILING, BASIC_RATE_RETAINED),
        (BASIC_RATE_CEILING, ADDITIONAL_RATE_THRESHOLD, HIGHER_RATE_RETAINED),
        (ADDITIONAL_RATE_THRESHOLD, f64::INFINITY, ADDITIONAL_RATE_RETAINED),
    ];
    let net = bands
        .iter()
        .filter(|(lower, _, _)| gross > *lower)
        .fold(PERSONAL_ALLOWANCE, |net, (lower, upper, retained)| {
            net + retained * (gross.min(*upper) - lower)
        });

    let tax = gross - net;
    debug!("income tax on {gross}: net {net}, tax {tax}");
    Ok(IncomeAfterTax { net, tax })
}

pub fn ni_contribution(gross: f64) -> Result<f64> {
    let gross = validate_gross(gross)?;
    let threshold = 12.0 * NI_PRIMARY_MONTHLY_THRESHOLD;

    let ni = if gross < threshold {
        0.0
    } else if gross <= BASIC_RATE_CEILING {
        NI_MAIN_RATE * (gross - threshold)
    } else {
        NI_MAIN_RATE * (BASIC_RATE_CEILING - threshold) + NI_UPPER_RATE * (gross - BASIC_RATE_CEILING)
    };
    Ok(ni)
}

pub fn student_loan_repayment(gross: f64, plan: StudentLoanPlan) -> Result<f64> {
    let gross = validate_gross(gross)?;
    let repayment = match plan.annual_threshold() {
        Some(threshold) if gross > threshold => STUDENT_LOAN_RATE * (gross - threshold),
        _ => 0.0,
    };
    Ok(repayment)
}

pub fn pension_contribution(gross: f64, fraction: f64) -> Result<f64> {
    let gross = validate_gross(gross)?;
    let fraction = ensure_fraction("pension_fraction", fraction)?;
    Ok(gross * fraction)
}

/// Gross pay less income tax, NI, student loan and pension contributions.
pub fn disposable_income(gross: f64, plan: StudentLoanPlan, pension_fraction: f64) -> Result<f64> {
    let net = income_less_tax(gross)?.net;
    let ni = ni_contribution(gross)?;
    let loan = student_loan_repayment(gross, plan)?;
    let pension = pension_contribution(gross, pension_fraction)?;

    let disposable = net - ni - loan - pension;
    debug!(
        "disposable income on {gross}: net {net} - ni {ni} - loan {loan} - pension {pension} = {disposable}"
    );
    Ok(disposable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn no_tax_within_personal_allowance() {
        let result = income_less_tax(12_570.0).unwrap();
        assert_eq!(result.net, 12_570.0);
        assert_eq!(result.tax, 0.0);
    }

    #[test]
    fn taxes_each_band_at_its_own_rate() {
        // Basic rate only
        assert_close(income_less_tax(30_000.0).unwrap().tax, 0.2 * (30_000.0 - 12_570.0));

        // Basic band fully used, remainder at higher rate
        let basic_tax = 0.2 * (50_270.0 - 12_570.0);
        assert_close(
            income_less_tax(100_000.0).unwrap().tax,
            basic_tax + 0.4 * (100_000.0 - 50_270.0),
        );

        // Into the additional band
        let higher_tax = 0.4 * (150_000.0 - 50_270.0);
        assert_close(
            income_less_tax(200_000.0).unwrap().tax,
            basic_tax + higher_tax + 0.45 * 50_000.0,
        );
    }

    #[test]
    fn net_and_tax_add_up_to_gross() {
        for gross in [0.0, 12_571.0, 50_270.0, 75_000.0, 150_000.0, 1_000_000.0] {
            let result = income_less_tax(gross).unwrap();
            assert_close(result.net + result.tax, gross);
        }
    }

    #[test]
    fn zero_gross_produces_zero_deductions() {
        assert_eq!(income_less_tax(0.0).unwrap(), IncomeAfterTax { net: 0.0, tax: 0.0 });
        assert_eq!(ni_contribution(0.0).unwrap(), 0.0);
        assert_eq!(student_loan_repayment(0.0, StudentLoanPlan::Plan1).unwrap(), 0.0);
        assert_eq!(pension_contribution(0.0, 0.1).unwrap(), 0.0);
        assert_eq!(disposable_income(0.0, StudentLoanPlan::Plan2, 0.1).unwrap(), 0.0);
    }

    #[test]
    fn rejects_negative_gross() {
        assert!(matches!(
            income_less_tax(-1.0),
            Err(FinanceError::InvalidInput { field: "gross_salary", .. })
        ));
        assert!(ni_contribution(-1.0).is_err());
        assert!(student_loan_repayment(-1.0, StudentLoanPlan::None).is_err());
        assert!(disposable_income(f64::NAN, StudentLoanPlan::None, 0.0).is_err());
        assert!(income_less_tax(MAX_GROSS_SALARY * 2.0).is_err());
    }

    #[test]
    fn ni_is_zero_up_to_primary_threshold() {
        assert_eq!(ni_contribution(9_876.0).unwrap(), 0.0);
        assert_close(ni_contribution(10_876.0).unwrap(), 132.5);
    }

    #[test]
    fn ni_switches_to_upper_rate_above_ceiling() {
        let at_ceiling = 0.1325 * (50_270.0 - 9_876.0);
        assert_close(ni_contribution(50_270.0).unwrap(), at_ceiling);
        assert_close(ni_contribution(60_270.0).unwrap(), at_ceiling + 325.0);
    }

    #[test]
    fn student_loan_depends_on_plan_threshold() {
        assert_eq!(student_loan_repayment(1_000_000.0, StudentLoanPlan::None).unwrap(), 0.0);
        assert_eq!(student_loan_repayment(20_184.0, StudentLoanPlan::Plan1).unwrap(), 0.0);
        assert_close(
            student_loan_repayment(30_184.0, StudentLoanPlan::Plan1).unwrap(),
            900.0,
        );
        assert_eq!(student_loan_repayment(27_288.0, StudentLoanPlan::Plan2).unwrap(), 0.0);
        assert_close(
            student_loan_repayment(37_288.0, StudentLoanPlan::Plan2).unwrap(),
            900.0,
        );
    }

    #[test]
    fn pension_rejects_out_of_range_fraction() {
        assert_close(pension_contribution(40_000.0, 0.05).unwrap(), 2_000.0);
        assert!(pension_contribution(40_000.0, 1.5).is_err());
        assert!(pension_contribution(40_000.0, -0.1).is_err());
    }

    #[test]
    fn disposable_income_at_basic_rate_ceiling() {
        // net 42_730 less NI 5_352.205, no loan or pension
        let disposable = disposable_income(50_270.0, StudentLoanPlan::None, 0.0).unwrap();
        assert_close(disposable, 37_377.795);
    }

    #[test]
    fn disposable_income_subtracts_every_deduction() {
        let gross = 45_000.0;
        let expected = income_less_tax(gross).unwrap().net
            - ni_contribution(gross).unwrap()
            - student_loan_repayment(gross, StudentLoanPlan::Plan2).unwrap()
            - pension_contribution(gross, 0.05).unwrap();
        assert_close(
            disposable_income(gross, StudentLoanPlan::Plan2, 0.05).unwrap(),
            expected,
        );
    }

    #[test]
    fn plan_codes_convert_from_numbers() {
        assert_eq!(StudentLoanPlan::try_from(0).unwrap(), StudentLoanPlan::None);
        assert_eq!(StudentLoanPlan::try_from(1).unwrap(), StudentLoanPlan::Plan1);
        assert_eq!(StudentLoanPlan::try_from(2).unwrap(), StudentLoanPlan::Plan2);
        assert!(StudentLoanPlan::try_from(3).is_err());
    }

    proptest! {
        #[test]
        fn no_tax_at_or_below_allowance(gross in 0.0f64..=12_570.0) {
            let result = income_less_tax(gross).unwrap();
            prop_assert_eq!(result.net, gross);
            prop_assert_eq!(result.tax, 0.0);
        }

        #[test]
        fn tax_is_non_decreasing(gross in 0.0f64..500_000.0, step in 0.0f64..5_000.0) {
            let lower = income_less_tax(gross).unwrap().tax;
            let higher = income_less_tax(gross + step).unwrap().tax;
            prop_assert!(higher >= lower - 1e-6);
        }

        #[test]
        fn ni_is_non_decreasing(gross in 0.0f64..500_000.0, step in 0.0f64..5_000.0) {
            let lower = ni_contribution(gross).unwrap();
            let higher = ni_contribution(gross + step).unwrap();
            prop_assert!(higher >= lower - 1e-6);
        }

        #[test]
        fn ni_is_zero_below_threshold(gross in 0.0f64..=9_876.0) {
            prop_assert_eq!(ni_contribution(gross).unwrap(), 0.0);
        }

        #[test]
        fn no_student_loan_without_plan(gross in 0.0f64..10_000_000.0) {
            prop_assert_eq!(student_loan_repayment(gross, StudentLoanPlan::None).unwrap(), 0.0);
        }
    }

    #[test]
    fn tax_is_continuous_at_band_boundaries() {
        for boundary in [PERSONAL_ALLOWANCE, BASIC_RATE_CEILING, ADDITIONAL_RATE_THRESHOLD] {
            let below = income_less_tax(boundary - 1e-6).unwrap().tax;
            let above = income_less_tax(boundary + 1e-6).unwrap().tax;
            assert!((above - below).abs() < 1e-5, "cliff at {boundary}");
        }
    }
}
