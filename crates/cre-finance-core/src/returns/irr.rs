use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, trace, warn};

use crate::error::CreFinanceError;
use crate::time_value::scaled_npv_and_derivative;
use crate::types::*;
use crate::CreFinanceResult;

const INITIAL_GUESS: Rate = dec!(0.10);
const MAX_IRR_ITERATIONS: u32 = 200;
const STEP_TOLERANCE: Decimal = dec!(0.0000001);
const DERIVATIVE_FLOOR: Decimal = dec!(0.000000000001);
const MIN_RATE: Rate = dec!(-0.99);
const MAX_RATE: Rate = dec!(10);

/// Hold periods longer than this are rejected by the calculator.
const MAX_PERIODS: usize = 50;

/// Exit-proceeds multipliers for the sensitivity curve.
const SENSITIVITY_STEPS: [Decimal; 13] = [
    dec!(0.5),
    dec!(0.6),
    dec!(0.7),
    dec!(0.8),
    dec!(0.9),
    dec!(1.0),
    dec!(1.1),
    dec!(1.2),
    dec!(1.3),
    dec!(1.4),
    dec!(1.5),
    dec!(1.75),
    dec!(2.0),
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How the Newton-Raphson solve ended.
///
/// `irr` is 0 whenever the status is `NonFinite` or `NotAttempted`, so callers
/// that only read the rate see the same value either way. The status tells
/// them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrStatus {
    /// Newton step fell below 1e-7
    Converged,
    /// |dNPV/dr| fell below 1e-12; the last guess is returned
    DerivativeVanished,
    /// 200 iterations without convergence; the last guess is returned
    IterationLimit,
    /// Cash flows too large to evaluate without overflow
    NonFinite,
    /// Zero investment or no cash flows
    NotAttempted,
}

impl IrrStatus {
    pub fn is_converged(self) -> bool {
        matches!(self, IrrStatus::Converged)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrResult {
    /// Periodic IRR as a decimal; 0 when unsolvable
    pub irr: Rate,
    pub equity_multiple: Multiple,
    pub status: IrrStatus,
}

/// One point on the exit-proceeds sensitivity curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrSensitivityPoint {
    /// Exit proceeds as a multiple of the base case (1.0 = base)
    pub exit_multiplier: Decimal,
    pub exit_proceeds: Money,
    pub irr: Rate,
    pub equity_multiple: Multiple,
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// Newton-Raphson IRR on a periodic cash-flow vector.
///
/// Starts at 10%, clamps every update to [-99%, 1000%] and gives up after 200
/// iterations. Negative rates are evaluated in scaled form, so a guess near
/// the lower clamp keeps iterating however long the hold. Only cash flows
/// too large to evaluate at all return `NonFinite` with a rate of 0.
pub fn solve_irr(cash_flows: &[Money]) -> (Rate, IrrStatus) {
    let mut rate = INITIAL_GUESS;

    for iteration in 0..MAX_IRR_ITERATIONS {
        let Some(eval) = scaled_npv_and_derivative(rate, cash_flows) else {
            debug!(iteration, %rate, "IRR evaluation overflowed");
            return (Decimal::ZERO, IrrStatus::NonFinite);
        };

        // |dNPV/dr| = |derivative| / scale
        if eval.derivative.is_zero() || eval.derivative.abs() < DERIVATIVE_FLOOR * eval.scale {
            debug!(iteration, %rate, "IRR derivative vanished");
            return (rate, IrrStatus::DerivativeVanished);
        }

        let Some(step) = eval.value.checked_div(eval.derivative) else {
            return (Decimal::ZERO, IrrStatus::NonFinite);
        };
        let Some(next) = rate.checked_sub(step) else {
            return (Decimal::ZERO, IrrStatus::NonFinite);
        };
        rate = next.clamp(MIN_RATE, MAX_RATE);
        trace!(iteration, %rate, npv = %eval.value, "IRR iteration");

        if step.abs() < STEP_TOLERANCE {
            debug!(iterations = iteration + 1, %rate, "IRR converged");
            return (rate, IrrStatus::Converged);
        }
    }

    debug!(%rate, "IRR hit iteration limit");
    (rate, IrrStatus::IterationLimit)
}

/// IRR and equity multiple for an equity investment.
///
/// The vector is `[-investment, cf_1, ..., cf_n + exit]`: exit proceeds land
/// in the final period rather than a period of their own. Zero investment or
/// no cash flows returns `{0, 0}` without solving.
pub fn irr_and_equity_multiple(
    initial_investment: Money,
    cash_flows: &[Money],
    exit_proceeds: Money,
) -> IrrResult {
    if initial_investment.is_zero() || cash_flows.is_empty() {
        return IrrResult {
            irr: Decimal::ZERO,
            equity_multiple: Decimal::ZERO,
            status: IrrStatus::NotAttempted,
        };
    }

    let mut flows = Vec::with_capacity(cash_flows.len() + 1);
    flows.push(-initial_investment);
    flows.extend_from_slice(cash_flows);
    if let Some(last) = flows.last_mut() {
        *last += exit_proceeds;
    }

    let total_distributions: Money = cash_flows.iter().sum::<Decimal>() + exit_proceeds;
    let equity_multiple = total_distributions / initial_investment;

    let (irr, status) = solve_irr(&flows);

    IrrResult {
        irr,
        equity_multiple,
        status,
    }
}

/// IRR at exit proceeds from 50% to 200% of the base case.
pub fn irr_sensitivity(
    initial_investment: Money,
    cash_flows: &[Money],
    base_exit_proceeds: Money,
) -> Vec<IrrSensitivityPoint> {
    SENSITIVITY_STEPS
        .iter()
        .map(|&multiplier| {
            let exit_proceeds = base_exit_proceeds * multiplier;
            let result = irr_and_equity_multiple(initial_investment, cash_flows, exit_proceeds);
            IrrSensitivityPoint {
                exit_multiplier: multiplier,
                exit_proceeds,
                irr: result.irr,
                equity_multiple: result.equity_multiple,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrInput {
    pub initial_investment: Money,
    /// Annual cash flows, one per year of the hold
    pub cash_flows: Vec<Money>,
    /// Net sale proceeds received with the final year's cash flow
    pub exit_proceeds: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrOutput {
    pub irr: Rate,
    pub equity_multiple: Multiple,
    pub status: IrrStatus,
    /// Sum of cash flows plus exit proceeds
    pub total_return: Money,
    pub hold_period_years: u32,
    pub sensitivity: Vec<IrrSensitivityPoint>,
}

/// Levered IRR and equity multiple for a hold, with exit sensitivity.
pub fn calculate_irr(input: &IrrInput) -> CreFinanceResult<ComputationOutput<IrrOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.initial_investment < Decimal::ZERO {
        return Err(CreFinanceError::invalid(
            "initial_investment",
            "Initial investment cannot be negative",
        ));
    }
    if input.cash_flows.is_empty() {
        return Err(CreFinanceError::InsufficientData(
            "IRR requires at least one period of cash flow".into(),
        ));
    }
    if input.cash_flows.len() > MAX_PERIODS {
        return Err(CreFinanceError::invalid(
            "cash_flows",
            format!("Hold period cannot exceed {MAX_PERIODS} periods"),
        ));
    }
    if input.initial_investment.is_zero() {
        warnings.push("Initial investment is zero; IRR and equity multiple reported as 0".into());
    }

    let result = irr_and_equity_multiple(
        input.initial_investment,
        &input.cash_flows,
        input.exit_proceeds,
    );

    match result.status {
        IrrStatus::Converged | IrrStatus::NotAttempted => {}
        IrrStatus::NonFinite => {
            warn!("IRR solver produced a non-finite rate");
            warnings.push("IRR could not be solved for these cash flows; reported as 0".into());
        }
        status => {
            warn!(?status, irr = %result.irr, "IRR solver did not converge");
            warnings.push(format!(
                "IRR solver did not converge ({status:?}); last estimate {} reported",
                result.irr
            ));
        }
    }

    let output = IrrOutput {
        irr: result.irr,
        equity_multiple: result.equity_multiple,
        status: result.status,
        total_return: input.cash_flows.iter().sum::<Decimal>() + input.exit_proceeds,
        hold_period_years: input.cash_flows.len() as u32,
        sensitivity: irr_sensitivity(
            input.initial_investment,
            &input.cash_flows,
            input.exit_proceeds,
        ),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "IRR (Newton-Raphson on NPV) and Equity Multiple",
        input,
        warnings,
        elapsed,
        output,
    ))
}
