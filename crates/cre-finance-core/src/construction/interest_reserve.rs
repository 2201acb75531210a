use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CreFinanceError;
use crate::types::*;
use crate::CreFinanceResult;

/// Draw plus lease-up months accepted by the calculator.
const MAX_TOTAL_MONTHS: u32 = 600;

/// Which phase of the construction loan a month falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionPhase {
    Draw,
    LeaseUp,
}

/// One row of the month-by-month draw schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionDrawMonth {
    /// 1-indexed
    pub month: u32,
    pub phase: ConstructionPhase,
    pub cumulative_drawn: Money,
    pub interest_payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructionInterestReserveResult {
    pub monthly_breakdown: Vec<ConstructionDrawMonth>,
    pub total_reserve: Money,
    pub avg_outstanding_balance: Money,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Interest reserve for an evenly drawn construction loan.
///
/// The budget is drawn in equal instalments over `draw_period_months`, then
/// held through `lease_up_months`. Each month accrues interest on the balance
/// drawn to date. With no draw months nothing is ever drawn.
pub fn construction_interest_reserve(
    total_budget: Money,
    draw_period_months: u32,
    lease_up_months: u32,
    annual_rate: Percent,
) -> ConstructionInterestReserveResult {
    construction_interest_reserve_with_offset(
        total_budget,
        draw_period_months,
        lease_up_months,
        annual_rate,
        Percent::ZERO,
    )
}

/// As [`construction_interest_reserve`], with lease-up interest reduced by
/// `lease_up_offset` percent to reflect in-place rents covering part of it.
pub fn construction_interest_reserve_with_offset(
    total_budget: Money,
    draw_period_months: u32,
    lease_up_months: u32,
    annual_rate: Percent,
    lease_up_offset: Percent,
) -> ConstructionInterestReserveResult {
    let total_months = draw_period_months.saturating_add(lease_up_months);
    let monthly_rate = annual_rate.monthly_rate();
    let monthly_draw = if draw_period_months == 0 {
        Decimal::ZERO
    } else {
        total_budget / Decimal::from(draw_period_months)
    };
    let lease_up_share = Decimal::ONE - lease_up_offset.to_rate();

    let mut cumulative_drawn = Decimal::ZERO;
    let mut total_reserve = Decimal::ZERO;
    let mut balance_sum = Decimal::ZERO;
    let mut monthly_breakdown = Vec::with_capacity(total_months as usize);

    for month in 1..=total_months {
        let phase = if month <= draw_period_months {
            cumulative_drawn += monthly_draw;
            ConstructionPhase::Draw
        } else {
            ConstructionPhase::LeaseUp
        };

        let mut interest = cumulative_drawn * monthly_rate;
        if phase == ConstructionPhase::LeaseUp {
            interest *= lease_up_share;
        }

        total_reserve += interest;
        balance_sum += cumulative_drawn;
        monthly_breakdown.push(ConstructionDrawMonth {
            month,
            phase,
            cumulative_drawn,
            interest_payment: interest,
        });
    }

    let avg_outstanding_balance = if total_months == 0 {
        Decimal::ZERO
    } else {
        balance_sum / Decimal::from(total_months)
    };

    ConstructionInterestReserveResult {
        monthly_breakdown,
        total_reserve,
        avg_outstanding_balance,
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructionInput {
    pub total_budget: Money,
    pub draw_period_months: u32,
    pub lease_up_months: u32,
    pub annual_rate: Percent,
    /// Share of lease-up interest covered by property cash flow (0-100)
    #[serde(default)]
    pub lease_up_offset: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructionOutput {
    pub total_reserve: Money,
    pub avg_outstanding_balance: Money,
    /// Reserve as a fraction of the construction budget
    pub reserve_pct_of_budget: Rate,
    pub monthly_breakdown: Vec<ConstructionDrawMonth>,
}

/// Construction loan interest reserve sizing.
pub fn calculate_construction_reserve(
    input: &ConstructionInput,
) -> CreFinanceResult<ComputationOutput<ConstructionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.total_budget < Decimal::ZERO {
        return Err(CreFinanceError::invalid(
            "total_budget",
            "Construction budget cannot be negative",
        ));
    }
    if input.annual_rate.value() < Decimal::ZERO {
        return Err(CreFinanceError::invalid(
            "annual_rate",
            "Interest rate cannot be negative",
        ));
    }
    let total_months = input.draw_period_months.saturating_add(input.lease_up_months);
    if total_months > MAX_TOTAL_MONTHS {
        return Err(CreFinanceError::invalid(
            "draw_period_months",
            format!("Draw and lease-up periods cannot exceed {MAX_TOTAL_MONTHS} months combined"),
        ));
    }
    if input.lease_up_offset.value() < Decimal::ZERO || input.lease_up_offset.value() > dec!(100) {
        return Err(CreFinanceError::invalid(
            "lease_up_offset",
            "Lease-up offset must be between 0 and 100 percent",
        ));
    }
    if input.draw_period_months == 0 {
        warnings.push("Draw period is zero months; no funds are drawn and no interest accrues".into());
    }

    let result = construction_interest_reserve_with_offset(
        input.total_budget,
        input.draw_period_months,
        input.lease_up_months,
        input.annual_rate,
        input.lease_up_offset,
    );

    let reserve_pct_of_budget = if input.total_budget > Decimal::ZERO {
        result.total_reserve / input.total_budget
    } else {
        Decimal::ZERO
    };

    let output = ConstructionOutput {
        total_reserve: result.total_reserve,
        avg_outstanding_balance: result.avg_outstanding_balance,
        reserve_pct_of_budget,
        monthly_breakdown: result.monthly_breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Construction Interest Reserve (even draws, monthly accrual)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twelve_month_draw_scenario() {
        let result = construction_interest_reserve(dec!(12000000), 12, 0, Percent(dec!(8)));
        assert_eq!(result.monthly_breakdown.len(), 12);
        assert_eq!(result.monthly_breakdown[0].cumulative_drawn, dec!(1000000));
        assert_eq!(result.monthly_breakdown[11].cumulative_drawn, dec!(12000000));

        let monthly_rate = dec!(0.08) / dec!(12);
        let expected: Decimal = (1..=12u32)
            .map(|m| Decimal::from(m) * dec!(1000000) * monthly_rate)
            .sum();
        // 78M of balance-months at 8%/12 = 520,000
        assert!((result.total_reserve - expected).abs() < dec!(0.000001));
        assert!((result.total_reserve - dec!(520000)).abs() < dec!(0.000001));
        assert_eq!(result.avg_outstanding_balance, dec!(6500000));
    }

    #[test]
    fn test_lease_up_accrues_on_full_balance() {
        let result = construction_interest_reserve(dec!(12000000), 12, 6, Percent(dec!(8)));
        assert_eq!(result.monthly_breakdown.len(), 18);
        let lease_up = &result.monthly_breakdown[12..];
        for row in lease_up {
            assert_eq!(row.phase, ConstructionPhase::LeaseUp);
            assert_eq!(row.cumulative_drawn, dec!(12000000));
            assert!((row.interest_payment - dec!(80000)).abs() < dec!(0.000001));
        }
        assert!((result.total_reserve - dec!(1000000)).abs() < dec!(0.00001));
    }

    #[test]
    fn test_zero_draw_period_draws_nothing() {
        let result = construction_interest_reserve(dec!(12000000), 0, 6, Percent(dec!(8)));
        assert_eq!(result.monthly_breakdown.len(), 6);
        assert!(result
            .monthly_breakdown
            .iter()
            .all(|m| m.cumulative_drawn.is_zero() && m.interest_payment.is_zero()));
        assert_eq!(result.total_reserve, Decimal::ZERO);
        assert_eq!(result.avg_outstanding_balance, Decimal::ZERO);
    }

    #[test]
    fn test_no_months_is_empty() {
        let result = construction_interest_reserve(dec!(1000000), 0, 0, Percent(dec!(8)));
        assert!(result.monthly_breakdown.is_empty());
        assert_eq!(result.total_reserve, Decimal::ZERO);
        assert_eq!(result.avg_outstanding_balance, Decimal::ZERO);
    }

    #[test]
    fn test_lease_up_offset_reduces_only_lease_up_interest() {
        let base = construction_interest_reserve(dec!(12000000), 12, 6, Percent(dec!(8)));
        let offset = construction_interest_reserve_with_offset(
            dec!(12000000),
            12,
            6,
            Percent(dec!(8)),
            Percent(dec!(25)),
        );
        for (a, b) in base.monthly_breakdown.iter().zip(&offset.monthly_breakdown) {
            match a.phase {
                ConstructionPhase::Draw => assert_eq!(a.interest_payment, b.interest_payment),
                ConstructionPhase::LeaseUp => {
                    assert_eq!(b.interest_payment, a.interest_payment * dec!(0.75))
                }
            }
        }
        assert_eq!(base.avg_outstanding_balance, offset.avg_outstanding_balance);
    }

    #[test]
    fn test_calculate_construction_reserve_pct_of_budget() {
        let input = ConstructionInput {
            total_budget: dec!(12000000),
            draw_period_months: 12,
            lease_up_months: 0,
            annual_rate: Percent(dec!(8)),
            lease_up_offset: Percent::ZERO,
        };
        let out = calculate_construction_reserve(&input).unwrap().result;
        assert!((out.reserve_pct_of_budget - dec!(520000) / dec!(12000000)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_calculate_construction_reserve_bounds_months() {
        let input = ConstructionInput {
            total_budget: dec!(12000000),
            draw_period_months: 500,
            lease_up_months: 200,
            annual_rate: Percent(dec!(8)),
            lease_up_offset: Percent::ZERO,
        };
        assert!(calculate_construction_reserve(&input).is_err());
    }

    #[test]
    fn test_calculate_construction_reserve_rejects_offset_above_100() {
        let input = ConstructionInput {
            total_budget: dec!(12000000),
            draw_period_months: 12,
            lease_up_months: 6,
            annual_rate: Percent(dec!(8)),
            lease_up_offset: Percent(dec!(150)),
        };
        assert!(calculate_construction_reserve(&input).is_err());
    }
}
