//! Internal rate of return solver.
//!
//! A sign change is bracketed and narrowed in `f64`, then
//! [`rust_finprim::rate::irr`] finishes the Newton iteration in `Decimal`
//! arithmetic. When the flows are too large for `Decimal`, or that Newton
//! run fails or leaves the bracket, the safeguarded `f64` refinement carries
//! on to the configured tolerance.
//!
//! The balance is evaluated as a present value above 0% and as a future
//! value below it. Both share their roots with the net present value and
//! neither overflows, so rates are searched from just above -100% up to a
//! growth factor of 1e12 per period.
use super::error::{FinanceError, Result};
use rust_decimal::{Decimal, prelude::*};
use rust_finprim::rate::irr as newton_irr;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Growth factors probed while bracketing, `1 + rate`.
const MIN_GROWTH: f64 = 1e-12;
const MAX_GROWTH: f64 = 1e12;

/// Rate precision reached in `f64` before the `Decimal` Newton run takes over.
const HANDOFF_TOLERANCE: f64 = 1e-6;

/// Largest discount factor and magnitude handed to `Decimal` arithmetic.
const DECIMAL_DISCOUNT_LIMIT: f64 = 1e10;
const DECIMAL_MAGNITUDE_LIMIT: f64 = 1e26;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Starting rate per period.
    pub guess: f64,
    pub tolerance: f64,
    /// Budget shared between bracketing and refinement.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            guess: 0.01,
            tolerance: 1e-10,
            max_iterations: 100,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.guess.is_finite() || self.guess <= -1.0 {
            return Err(FinanceError::invalid(
                "solver.guess",
                self.guess,
                "must be a finite rate above -100%",
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(FinanceError::invalid(
                "solver.tolerance",
                self.tolerance,
                "must be > 0",
            ));
        }
        if self.max_iterations == 0 {
            return Err(FinanceError::invalid(
                "solver.max_iterations",
                0.0,
                "must be > 0",
            ));
        }
        Ok(())
    }
}

/// Balance of the cash flows at `rate` and its slope with respect to the
/// rate. Discounted to the first period from 0% up, grown to the last period
/// below 0%.
fn balance_and_slope(cash_flows: &[f64], rate: f64) -> (f64, f64) {
    let growth = 1.0 + rate;
    let mut value = 0.0;
    let mut slope = 0.0;
    if growth >= 1.0 {
        let discount = 1.0 / growth;
        for cf in cash_flows.iter().rev() {
            slope = slope * discount + value;
            value = value * discount + cf;
        }
        // d(discount)/d(rate) = -discount^2
        (value, -slope * discount * discount)
    } else {
        for cf in cash_flows {
            slope = slope * growth + value;
            value = value * growth + cf;
        }
        (value, slope)
    }
}

fn same_sign(a: f64, b: f64) -> bool {
    (a > 0.0 && b > 0.0) || (a < 0.0 && b < 0.0)
}

/// Rates known to sit on either side of a root.
#[derive(Debug, Clone, Copy)]
struct Bracket {
    lo: f64,
    value_lo: f64,
    hi: f64,
}

enum Start {
    Root(f64),
    Bracket(Bracket),
}

struct Solver<'a> {
    cash_flows: &'a [f64],
    config: &'a SolverConfig,
    iterations: u32,
}

impl Solver<'_> {
    fn spend_iteration(&mut self) -> Result<()> {
        if self.iterations >= self.config.max_iterations {
            return Err(FinanceError::NoConvergence {
                iterations: self.iterations,
            });
        }
        self.iterations += 1;
        Ok(())
    }

    fn balance(&self, rate: f64) -> f64 {
        balance_and_slope(self.cash_flows, rate).0
    }

    /// Widens outwards from the guess, halving the growth factor below it
    /// and doubling it above, until the balance changes sign.
    fn bracket(&mut self) -> Result<Start> {
        let guess = self.config.guess;
        let value_guess = self.balance(guess);
        if value_guess == 0.0 {
            return Ok(Start::Root(guess));
        }

        let (mut lo, mut value_lo) = (guess, value_guess);
        let (mut hi, mut value_hi) = (guess, value_guess);
        loop {
            let can_lower = 1.0 + lo > MIN_GROWTH;
            let can_raise = 1.0 + hi < MAX_GROWTH;
            if !can_lower && !can_raise {
                debug!("no sign change between rates {lo} and {hi}");
                return Err(FinanceError::NoConvergence {
                    iterations: self.iterations,
                });
            }
            self.spend_iteration()?;

            if can_raise {
                let next = 2.0 * (1.0 + hi) - 1.0;
                let value_next = self.balance(next);
                if value_next == 0.0 {
                    return Ok(Start::Root(next));
                }
                if !same_sign(value_hi, value_next) {
                    debug!("bracketed rate in [{hi}, {next}] after {} iterations", self.iterations);
                    return Ok(Start::Bracket(Bracket {
                        lo: hi,
                        value_lo: value_hi,
                        hi: next,
                    }));
                }
                (hi, value_hi) = (next, value_next);
            }

            if can_lower {
                let next = 0.5 * (1.0 + lo) - 1.0;
                let value_next = self.balance(next);
                if value_next == 0.0 {
                    return Ok(Start::Root(next));
                }
                if !same_sign(value_lo, value_next) {
                    debug!("bracketed rate in [{next}, {lo}] after {} iterations", self.iterations);
                    return Ok(Start::Bracket(Bracket {
                        lo: next,
                        value_lo: value_next,
                        hi: lo,
                    }));
                }
                (lo, value_lo) = (next, value_next);
            }
        }
    }
}

/// Newton steps inside a bracket. A step that leaves the bracket, or that
/// fails to halve the step before last, is replaced by bisection.
struct Refinement {
    bracket: Bracket,
    rate: f64,
    last_step: f64,
    step_before_last: f64,
}

impl Refinement {
    fn new(bracket: Bracket, guess: f64) -> Self {
        let rate = if guess > bracket.lo && guess < bracket.hi {
            guess
        } else {
            0.5 * (bracket.lo + bracket.hi)
        };
        let width = bracket.hi - bracket.lo;
        Refinement {
            bracket,
            rate,
            last_step: width,
            step_before_last: width,
        }
    }

    fn run(&mut self, solver: &mut Solver<'_>, tolerance: f64) -> Result<f64> {
        loop {
            solver.spend_iteration()?;
            let rate = self.rate;
            let (value, slope) = balance_and_slope(solver.cash_flows, rate);
            if value == 0.0 {
                return Ok(rate);
            }
            let bracket = &mut self.bracket;
            if same_sign(value, bracket.value_lo) {
                bracket.lo = rate;
                bracket.value_lo = value;
            } else {
                bracket.hi = rate;
            }

            let newton = rate - value / slope;
            let next = if slope != 0.0
                && newton.is_finite()
                && newton > bracket.lo
                && newton < bracket.hi
                && 2.0 * (newton - rate).abs() <= self.step_before_last.abs()
            {
                newton
            } else {
                0.5 * (bracket.lo + bracket.hi)
            };
            self.step_before_last = self.last_step;
            self.last_step = next - rate;
            self.rate = next;

            if (next - rate).abs() <= tolerance * (1.0 + rate.abs())
                || bracket.hi - bracket.lo <= tolerance
            {
                return Ok(next);
            }
        }
    }
}

/// The `Decimal` Newton run starting from an `f64` estimate.
struct DecimalProblem {
    cash_flows: Vec<Decimal>,
    seed: Decimal,
    npv_tolerance: Decimal,
}

impl DecimalProblem {
    /// `None` unless every value computed near `rate` stays well inside
    /// `Decimal`'s range.
    fn new(cash_flows: &[f64], rate: f64, tolerance: f64) -> Option<Self> {
        let growth = 1.0 + rate;
        let periods = cash_flows.len() as f64;
        let deepest_discount = growth.powf(-periods).max(growth.powf(periods));
        let largest = cash_flows.iter().fold(0.0_f64, |m, cf| m.max(cf.abs()));
        if deepest_discount > DECIMAL_DISCOUNT_LIMIT
            || largest * periods * periods * deepest_discount / growth.min(1.0)
                > DECIMAL_MAGNITUDE_LIMIT
        {
            return None;
        }

        // newton_irr stops on |npv| < tolerance, so the rate tolerance is
        // scaled by the npv slope at the seed.
        let npv_slope: f64 = cash_flows
            .iter()
            .enumerate()
            .map(|(t, cf)| -(t as f64) * cf * growth.powf(-(t as f64) - 1.0))
            .sum();
        Some(DecimalProblem {
            cash_flows: cash_flows
                .iter()
                .map(|cf| Decimal::from_f64(*cf))
                .collect::<Option<Vec<_>>>()?,
            seed: Decimal::from_f64(rate)?,
            npv_tolerance: Decimal::from_f64(tolerance * npv_slope.abs())?,
        })
    }

    fn solve(&self) -> std::result::Result<f64, String> {
        match newton_irr(&self.cash_flows, Some(self.seed), Some(self.npv_tolerance)) {
            Ok(rate) => rate
                .to_f64()
                .ok_or_else(|| format!("rate {rate} is not representable")),
            Err((rate, npv)) => Err(format!("stopped at {rate} with npv {npv}")),
        }
    }
}

/// Solves for the periodic rate at which `cash_flows` net to zero.
///
/// Fails with [`FinanceError::NoConvergence`] when the flows never change
/// sign (no rate can balance them), when no sign change is found between
/// -100% and a growth factor of 1e12, or when the iteration budget runs out.
pub fn irr(cash_flows: &[f64], config: &SolverConfig) -> Result<f64> {
    config.validate()?;
    if let Some(cf) = cash_flows.iter().find(|cf| !cf.is_finite()) {
        return Err(FinanceError::invalid("cash_flow", *cf, "must be finite"));
    }

    let has_inflow = cash_flows.iter().any(|cf| *cf > 0.0);
    let has_outflow = cash_flows.iter().any(|cf| *cf < 0.0);
    if !has_inflow || !has_outflow {
        debug!("cash flows never change sign, no rate balances them");
        return Err(FinanceError::NoConvergence { iterations: 0 });
    }

    let mut solver = Solver {
        cash_flows,
        config,
        iterations: 0,
    };
    let bracket = match solver.bracket()? {
        Start::Root(rate) => return Ok(rate),
        Start::Bracket(bracket) => bracket,
    };

    let mut refinement = Refinement::new(bracket, config.guess);
    let seed = refinement.run(&mut solver, config.tolerance.max(HANDOFF_TOLERANCE))?;
    if config.tolerance >= HANDOFF_TOLERANCE {
        return Ok(seed);
    }

    if let Some(problem) = DecimalProblem::new(cash_flows, seed, config.tolerance) {
        let Bracket { lo, hi, .. } = refinement.bracket;
        match problem.solve() {
            Ok(rate) if rate >= lo && rate <= hi => {
                debug!("rate converged to {rate} after {} iterations", solver.iterations);
                return Ok(rate);
            }
            Ok(rate) => debug!("newton run left the bracket at {rate}, refining in f64"),
            Err(reason) => debug!("newton run from {seed} {reason}, refining in f64"),
        }
    }

    let rate = refinement.run(&mut solver, config.tolerance)?;
    debug!("rate converged to {rate} after {} iterations", solver.iterations);
    Ok(rate)
}
