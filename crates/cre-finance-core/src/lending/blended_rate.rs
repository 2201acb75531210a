use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CreFinanceError;
use crate::types::*;
use crate::CreFinanceResult;

/// One layer of a multi-tranche capital stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTranche {
    pub amount: Money,
    /// Coupon as an annual percentage
    pub rate: Percent,
    /// Origination points as a percentage of the tranche
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Percent>,
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// Amount-weighted average coupon. Zero when the stack is empty.
pub fn blended_rate(tranches: &[LoanTranche]) -> Percent {
    let total: Money = tranches.iter().map(|t| t.amount).sum();
    if total.is_zero() {
        return Percent::ZERO;
    }
    let weighted: Decimal = tranches.iter().map(|t| t.amount * t.rate.value()).sum();
    Percent(weighted / total)
}

/// Coupon plus origination points spread straight-line over the term:
/// `rate + points / (term_months / 12)`.
///
/// This is linear point amortization, not a yield-to-maturity. A zero term
/// returns the coupon unchanged.
pub fn effective_rate_with_points(rate: Percent, points: Percent, term_months: u32) -> Percent {
    if term_months == 0 {
        return rate;
    }
    let term_years = Decimal::from(term_months) / Decimal::from(12);
    Percent(rate.value() + points.value() / term_years)
}

/// Amount-weighted average of each tranche's effective rate.
pub fn blended_effective_rate(tranches: &[LoanTranche], term_months: u32) -> Percent {
    let total: Money = tranches.iter().map(|t| t.amount).sum();
    if total <= Decimal::ZERO || term_months == 0 {
        return Percent::ZERO;
    }
    let weighted: Decimal = tranches
        .iter()
        .map(|t| {
            let effective =
                effective_rate_with_points(t.rate, t.points.unwrap_or_default(), term_months);
            t.amount * effective.value()
        })
        .sum();
    Percent(weighted / total)
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendedRateInput {
    pub tranches: Vec<LoanTranche>,
    /// Loan term over which points are amortized
    pub term_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrancheBreakdown {
    pub amount: Money,
    /// Share of the total stack (decimal)
    pub weight: Rate,
    pub rate: Percent,
    pub effective_rate: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendedRateOutput {
    pub blended_rate: Percent,
    pub blended_effective_rate: Percent,
    pub total_amount: Money,
    pub tranches: Vec<TrancheBreakdown>,
}

/// Blended coupon and all-in rate for a senior/mezz/pref capital stack.
pub fn calculate_blended_rate(
    input: &BlendedRateInput,
) -> CreFinanceResult<ComputationOutput<BlendedRateOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.tranches.is_empty() {
        return Err(CreFinanceError::InsufficientData(
            "At least one loan tranche is required".into(),
        ));
    }
    for (i, tranche) in input.tranches.iter().enumerate() {
        if tranche.amount < Decimal::ZERO {
            return Err(CreFinanceError::invalid(
                &format!("tranches[{i}].amount"),
                "Tranche amount cannot be negative",
            ));
        }
    }
    if input.term_months == 0 {
        warnings.push("Term is zero months; points are excluded from the effective rate".into());
    }

    let total_amount: Money = input.tranches.iter().map(|t| t.amount).sum();
    if total_amount.is_zero() {
        warnings.push("Total tranche amount is zero; blended rates reported as 0".into());
    }

    let tranches = input
        .tranches
        .iter()
        .map(|t| TrancheBreakdown {
            amount: t.amount,
            weight: if total_amount.is_zero() {
                Decimal::ZERO
            } else {
                t.amount / total_amount
            },
            rate: t.rate,
            effective_rate: effective_rate_with_points(
                t.rate,
                t.points.unwrap_or_default(),
                input.term_months,
            ),
        })
        .collect();

    let output = BlendedRateOutput {
        blended_rate: blended_rate(&input.tranches),
        blended_effective_rate: blended_effective_rate(&input.tranches, input.term_months),
        total_amount,
        tranches,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Amount-Weighted Blended Rate (points amortized straight-line)",
        input,
        warnings,
        elapsed,
        output,
    ))
}
