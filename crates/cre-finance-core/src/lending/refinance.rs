use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CreFinanceError;
use crate::lending::amortization::{monthly_payment, validate_loan_terms};
use crate::types::*;
use crate::CreFinanceResult;

/// Input for refinance savings: the existing loan against a proposed one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceInput {
    pub current_balance: Money,
    pub current_rate: Percent,
    /// Years left on the existing amortization schedule
    pub current_remaining_years: u32,
    pub new_amount: Money,
    pub new_rate: Percent,
    pub new_amort_years: u32,
    pub closing_costs: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinanceSavingsResult {
    pub current_monthly: Money,
    pub new_monthly: Money,
    pub monthly_savings: Money,
    pub annual_savings: Money,
    /// Savings across the full new amortization, net of closing costs
    pub lifetime_savings: Money,
    /// Months of savings needed to recoup closing costs; 0 when there are no
    /// savings, saturating at `u32::MAX` when the savings are vanishingly small
    pub break_even_months: u32,
}

/// Payment comparison between the current loan and a refinance.
///
/// Lifetime savings run over the whole new amortization and ignore any
/// balloon or term horizon.
pub fn refinance_savings(input: &RefinanceInput) -> RefinanceSavingsResult {
    let current_monthly = monthly_payment(
        input.current_balance,
        input.current_rate,
        input.current_remaining_years,
    );
    let new_monthly = monthly_payment(input.new_amount, input.new_rate, input.new_amort_years);

    let monthly_savings = current_monthly - new_monthly;
    let annual_savings = monthly_savings * Decimal::from(12);
    let lifetime_savings = monthly_savings * Decimal::from(input.new_amort_years) * Decimal::from(12)
        - input.closing_costs;

    let break_even_months = if monthly_savings > Decimal::ZERO {
        (input.closing_costs / monthly_savings)
            .ceil()
            .to_u32()
            .unwrap_or(u32::MAX)
    } else {
        0
    };

    RefinanceSavingsResult {
        current_monthly,
        new_monthly,
        monthly_savings,
        annual_savings,
        lifetime_savings,
        break_even_months,
    }
}

/// Refinance savings wrapped with validation and warnings.
pub fn calculate_refinance(
    input: &RefinanceInput,
) -> CreFinanceResult<ComputationOutput<RefinanceSavingsResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan_terms(
        input.current_balance,
        input.current_rate,
        input.current_remaining_years,
    )?;
    validate_loan_terms(input.new_amount, input.new_rate, input.new_amort_years)?;
    if input.closing_costs < Decimal::ZERO {
        return Err(CreFinanceError::invalid(
            "closing_costs",
            "Closing costs cannot be negative",
        ));
    }

    let result = refinance_savings(input);

    if result.monthly_savings <= Decimal::ZERO {
        warnings.push("New payment is not lower than the current payment; no break-even".into());
    } else if result.lifetime_savings < Decimal::ZERO {
        warnings.push("Closing costs exceed savings over the new amortization".into());
    }
    if input.new_amount > input.current_balance {
        warnings.push("New loan amount exceeds current balance (cash-out refinance)".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Refinance Savings (payment comparison, net of closing costs)",
        input,
        warnings,
        elapsed,
        result,
    ))
}
