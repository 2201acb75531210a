use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CreFinanceError;
use crate::lending::amortization::{monthly_payment, validate_loan_terms};
use crate::time_value::discount_factor;
use crate::types::*;
use crate::CreFinanceResult;

/// Largest principal whose debt service keeps coverage at `target_dscr`.
///
/// Inverts the amortization formula: P = pmt * (1 - (1+r)^-n) / r, where
/// pmt = NOI / target DSCR / 12. Zero rate gives `pmt * n`; a zero target
/// DSCR returns 0.
pub fn max_loan_amount(
    noi: Money,
    annual_rate: Percent,
    amortization_years: u32,
    target_dscr: Multiple,
) -> Money {
    if target_dscr.is_zero() {
        return Decimal::ZERO;
    }

    let max_annual_debt_service = noi / target_dscr;
    let payment = max_annual_debt_service / Decimal::from(12);
    let monthly_rate = annual_rate.monthly_rate();
    let num_payments = amortization_years.saturating_mul(12);

    if monthly_rate.is_zero() {
        return payment * Decimal::from(num_payments);
    }

    match discount_factor(monthly_rate, num_payments) {
        Some(discount) => payment * (Decimal::ONE - discount) / monthly_rate,
        None => Decimal::ZERO,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxLoanInput {
    pub noi: Money,
    pub annual_rate: Percent,
    pub amortization_years: u32,
    /// Lender's minimum coverage (e.g. 1.25)
    pub target_dscr: Multiple,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxLoanOutput {
    pub max_loan_amount: Money,
    pub monthly_payment: Money,
    pub annual_debt_service: Money,
}

/// Loan sizing from NOI and a target DSCR.
pub fn calculate_max_loan(input: &MaxLoanInput) -> CreFinanceResult<ComputationOutput<MaxLoanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan_terms(Decimal::ZERO, input.annual_rate, input.amortization_years)?;
    if input.target_dscr <= Decimal::ZERO {
        return Err(CreFinanceError::invalid(
            "target_dscr",
            "Target DSCR must be positive",
        ));
    }
    if input.target_dscr < Decimal::ONE {
        warnings.push(format!(
            "Target DSCR {} is below 1.00x; sized debt service exceeds NOI",
            input.target_dscr
        ));
    }
    if input.noi <= Decimal::ZERO {
        warnings.push("NOI is not positive; no debt can be supported".into());
    }

    let max_loan = max_loan_amount(
        input.noi,
        input.annual_rate,
        input.amortization_years,
        input.target_dscr,
    );
    let payment = monthly_payment(max_loan, input.annual_rate, input.amortization_years);

    let output = MaxLoanOutput {
        max_loan_amount: max_loan,
        monthly_payment: payment,
        annual_debt_service: payment * Decimal::from(12),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Maximum Loan from Target DSCR (Inverted Amortization)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lending::ratios::dscr;
    use rust_decimal_macros::dec;

    #[test]
    fn test_max_loan_hits_target_dscr() {
        let noi = dec!(750000);
        let rate = Percent(dec!(5.5));
        let loan = max_loan_amount(noi, rate, 30, dec!(1.25));
        let annual_ds = monthly_payment(loan, rate, 30) * dec!(12);
        let coverage = dscr(noi, annual_ds);
        assert!(
            (coverage - dec!(1.25)).abs() < dec!(0.000001),
            "Expected 1.25x, got {}",
            coverage
        );
        // 600k of debt service at 5.5%/30y supports ~8.81M
        assert!(loan > dec!(8800000) && loan < dec!(8820000));
    }

    #[test]
    fn test_max_loan_extreme_rate_is_interest_only() {
        // 50k/month at 50%/month: the discount factor underflows, P = pmt / r
        let loan = max_loan_amount(dec!(750000), Percent(dec!(600)), 30, dec!(1.25));
        assert_eq!(loan, dec!(100000));
        let payment = monthly_payment(loan, Percent(dec!(600)), 30);
        assert_eq!(payment, dec!(50000));
    }

    #[test]
    fn test_max_loan_zero_rate() {
        // 120k/yr of debt service over 10 years at 0%
        let loan = max_loan_amount(dec!(150000), Percent::ZERO, 10, dec!(1.25));
        assert_eq!(loan, dec!(1200000));
    }

    #[test]
    fn test_max_loan_zero_target_degrades_to_zero() {
        assert_eq!(
            max_loan_amount(dec!(750000), Percent(dec!(5.5)), 30, Decimal::ZERO),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_calculate_max_loan_envelope() {
        let input = MaxLoanInput {
            noi: dec!(750000),
            annual_rate: Percent(dec!(5.5)),
            amortization_years: 30,
            target_dscr: dec!(1.25),
        };
        let out = calculate_max_loan(&input).unwrap();
        assert!((out.result.annual_debt_service - dec!(600000)).abs() < dec!(0.01));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_calculate_max_loan_rejects_zero_target() {
        let input = MaxLoanInput {
            noi: dec!(750000),
            annual_rate: Percent(dec!(5.5)),
            amortization_years: 30,
            target_dscr: Decimal::ZERO,
        };
        assert!(calculate_max_loan(&input).is_err());
    }
}
