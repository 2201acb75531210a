use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CreFinanceError;
use crate::time_value::discount_factor;
use crate::types::*;
use crate::CreFinanceResult;

/// Schedules are reported for at most this many years.
const MAX_SCHEDULE_YEARS: u32 = 40;

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// Fixed-rate, fully-amortizing monthly payment: L * r / (1 - (1+r)^-n).
///
/// A zero rate amortizes straight-line (`L / n`) and a zero-length schedule
/// returns 0. When (1+r)^-n underflows the payment tends to interest-only
/// (`L * r`).
pub fn monthly_payment(loan_amount: Money, annual_rate: Percent, amortization_years: u32) -> Money {
    let monthly_rate = annual_rate.monthly_rate();
    let num_payments = amortization_years.saturating_mul(12);
    if num_payments == 0 {
        return Decimal::ZERO;
    }
    if monthly_rate.is_zero() {
        return loan_amount / Decimal::from(num_payments);
    }

    let Some(discount) = discount_factor(monthly_rate, num_payments) else {
        return Decimal::ZERO;
    };
    let denominator = Decimal::ONE - discount;
    if denominator.is_zero() {
        return Decimal::ZERO;
    }

    loan_amount * monthly_rate / denominator
}

/// Principal outstanding after `loan_term_years` of payments on an
/// `amortization_years` schedule. Never negative.
///
/// Priced as the present value of the payments still owed:
/// pmt * (1 - (1+r)^-(n-k)) / r.
pub fn balloon_balance(
    loan_amount: Money,
    annual_rate: Percent,
    amortization_years: u32,
    loan_term_years: u32,
) -> Money {
    let monthly_rate = annual_rate.monthly_rate();
    let num_payments = amortization_years.saturating_mul(12);
    let payments_made = loan_term_years.saturating_mul(12);
    if num_payments == 0 || payments_made >= num_payments {
        return Decimal::ZERO;
    }

    let balance = if monthly_rate.is_zero() {
        loan_amount * (Decimal::ONE - Decimal::from(payments_made) / Decimal::from(num_payments))
    } else {
        let payment = monthly_payment(loan_amount, annual_rate, amortization_years);
        match discount_factor(monthly_rate, num_payments - payments_made) {
            Some(discount) => payment * (Decimal::ONE - discount) / monthly_rate,
            None => Decimal::ZERO,
        }
    };

    balance.max(Decimal::ZERO)
}

/// Year-by-year principal, interest and closing balance, simulated monthly.
///
/// Covers `min(amortization_years, 40)` years and stops once the balance is
/// paid down.
pub fn amortization_schedule(
    loan_amount: Money,
    annual_rate: Percent,
    amortization_years: u32,
) -> Vec<AmortizationYear> {
    let monthly_rate = annual_rate.monthly_rate();
    let payment = monthly_payment(loan_amount, annual_rate, amortization_years);
    let years_to_show = amortization_years.min(MAX_SCHEDULE_YEARS);

    let mut balance = loan_amount;
    let mut rows = Vec::with_capacity(years_to_show as usize);

    for year in 1..=years_to_show {
        let mut year_principal = Decimal::ZERO;
        let mut year_interest = Decimal::ZERO;

        for _ in 0..12 {
            if balance <= Decimal::ZERO {
                break;
            }
            let interest = balance * monthly_rate;
            let principal = (payment - interest).min(balance);
            year_interest += interest;
            year_principal += principal;
            balance -= principal;
        }

        rows.push(AmortizationYear {
            year,
            principal: year_principal,
            interest: year_interest,
            balance: balance.max(Decimal::ZERO),
        });
    }

    rows
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Input for the loan payment calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPaymentInput {
    pub loan_amount: Money,
    /// Annual interest rate as a percentage (5.5 = 5.5%)
    pub annual_rate: Percent,
    pub amortization_years: u32,
    /// Loan term; a balloon is reported when shorter than the amortization
    pub loan_term_years: u32,
}

/// One year of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    pub year: u32,
    pub principal: Money,
    pub interest: Money,
    pub balance: Money,
}

/// Output of the loan payment calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPaymentOutput {
    pub monthly_payment: Money,
    pub annual_payment: Money,
    /// Interest paid over the full amortization, ignoring any balloon
    pub total_interest: Money,
    /// Balance due at maturity when term < amortization
    pub balloon_balance: Option<Money>,
    pub schedule: Vec<AmortizationYear>,
}

/// Monthly payment, annual debt service, total interest and balloon for a
/// fixed-rate CRE loan.
pub fn analyze_loan_payment(
    input: &LoanPaymentInput,
) -> CreFinanceResult<ComputationOutput<LoanPaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan_terms(input.loan_amount, input.annual_rate, input.amortization_years)?;
    if input.loan_term_years == 0 {
        return Err(CreFinanceError::invalid(
            "loan_term_years",
            "Loan term must be at least one year",
        ));
    }
    if input.loan_term_years > input.amortization_years {
        warnings.push(format!(
            "Loan term ({}y) exceeds amortization ({}y); loan is fully repaid before maturity",
            input.loan_term_years, input.amortization_years
        ));
    }

    let monthly = monthly_payment(input.loan_amount, input.annual_rate, input.amortization_years);
    let annual = monthly * Decimal::from(12);
    let total_interest =
        monthly * Decimal::from(input.amortization_years) * Decimal::from(12) - input.loan_amount;

    let balloon = if input.loan_term_years < input.amortization_years {
        Some(balloon_balance(
            input.loan_amount,
            input.annual_rate,
            input.amortization_years,
            input.loan_term_years,
        ))
    } else {
        None
    };

    let output = LoanPaymentOutput {
        monthly_payment: monthly,
        annual_payment: annual,
        total_interest,
        balloon_balance: balloon,
        schedule: amortization_schedule(
            input.loan_amount,
            input.annual_rate,
            input.amortization_years,
        ),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Rate Amortizing Loan Payment",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Shared validation for calculators that price an amortizing loan.
pub(crate) fn validate_loan_terms(
    loan_amount: Money,
    annual_rate: Percent,
    amortization_years: u32,
) -> CreFinanceResult<()> {
    if loan_amount < Decimal::ZERO {
        return Err(CreFinanceError::invalid(
            "loan_amount",
            "Loan amount cannot be negative",
        ));
    }
    if annual_rate.value() < Decimal::ZERO {
        return Err(CreFinanceError::invalid(
            "annual_rate",
            "Interest rate cannot be negative",
        ));
    }
    if amortization_years == 0 {
        return Err(CreFinanceError::invalid(
            "amortization_years",
            "Amortization must be at least one year",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pct(v: Decimal) -> Percent {
        Percent(v)
    }

    #[test]
    fn test_thirty_year_payment() {
        let payment = monthly_payment(dec!(10_000_000), pct(dec!(5.5)), 30);
        // Exact evaluation of the formula gives 56,778.90 to the cent
        assert!(
            (payment - dec!(56778.90)).abs() < dec!(0.01),
            "Expected ~56,778.90, got {}",
            payment
        );
        // The 56,786.28 figure quoted for this loan is 0.013% high; it is
        // only matched within 0.02%
        assert!((payment - dec!(56786.28)).abs() / payment < dec!(0.0002));
    }

    #[test]
    fn test_extreme_rate_payment_stays_finite() {
        // 200%: (1+r)^n is representable but L * r * (1+r)^n is not
        let payment = monthly_payment(dec!(10_000_000), pct(dec!(200)), 30);
        let interest_only = dec!(10_000_000) * dec!(200) / dec!(1200);
        assert!(
            (payment - interest_only).abs() < dec!(0.01),
            "Expected ~{}, got {}",
            interest_only,
            payment
        );

        // 600%: (1+r)^n overflows, so the payment is exactly interest-only
        let payment = monthly_payment(dec!(10_000_000), pct(dec!(600)), 30);
        assert_eq!(payment, dec!(5_000_000));
    }

    #[test]
    fn test_extreme_rate_balloon_is_nearly_full_principal() {
        let balance = balloon_balance(dec!(10_000_000), pct(dec!(600)), 30, 10);
        assert!((balance - dec!(10_000_000)).abs() < dec!(0.01));
        let schedule = amortization_schedule(dec!(10_000_000), pct(dec!(600)), 30);
        assert!((schedule[0].interest - dec!(60_000_000)).abs() < dec!(0.01));
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let payment = monthly_payment(dec!(1_200_000), Percent::ZERO, 10);
        assert_eq!(payment, dec!(1_200_000) / dec!(120));
        assert_eq!(payment, dec!(10000));
    }

    #[test]
    fn test_zero_amortization_degrades_to_zero() {
        assert_eq!(monthly_payment(dec!(1000), pct(dec!(5)), 0), Decimal::ZERO);
        assert_eq!(monthly_payment(dec!(1000), Percent::ZERO, 0), Decimal::ZERO);
    }

    #[test]
    fn test_balloon_full_term_is_zero() {
        for rate in [dec!(0), dec!(3.25), dec!(5.5), dec!(12)] {
            let balance = balloon_balance(dec!(5_000_000), pct(rate), 25, 25);
            assert!(
                balance.abs() < dec!(0.000001),
                "Balance at maturity should be 0 at {}%, got {}",
                rate,
                balance
            );
        }
    }

    #[test]
    fn test_balloon_ten_year_term() {
        // 10M @ 5.5%, 30y amortization, 10y term: ~8.254M outstanding
        let balance = balloon_balance(dec!(10_000_000), pct(dec!(5.5)), 30, 10);
        assert!((balance - dec!(8254099.11)).abs() < dec!(0.01));
    }

    #[test]
    fn test_balloon_zero_rate_prorates() {
        let balance = balloon_balance(dec!(1_000_000), Percent::ZERO, 20, 5);
        assert_eq!(balance, dec!(750000));
    }

    #[test]
    fn test_balloon_floors_at_zero() {
        let balance = balloon_balance(dec!(1_000_000), Percent::ZERO, 10, 15);
        assert_eq!(balance, Decimal::ZERO);
    }

    #[test]
    fn test_schedule_matches_balloon() {
        let schedule = amortization_schedule(dec!(10_000_000), pct(dec!(5.5)), 30);
        assert_eq!(schedule.len(), 30);
        let after_ten = schedule[9].balance;
        let balloon = balloon_balance(dec!(10_000_000), pct(dec!(5.5)), 30, 10);
        assert!((after_ten - balloon).abs() < dec!(0.01));
        assert!(schedule[29].balance < dec!(0.01));
    }

    #[test]
    fn test_schedule_caps_at_forty_years() {
        let schedule = amortization_schedule(dec!(1_000_000), pct(dec!(4)), 50);
        assert_eq!(schedule.len(), 40);
        assert_eq!(schedule.last().unwrap().year, 40);
    }

    #[test]
    fn test_analyze_loan_payment_reports_balloon() {
        let input = LoanPaymentInput {
            loan_amount: dec!(10_000_000),
            annual_rate: pct(dec!(5.5)),
            amortization_years: 30,
            loan_term_years: 10,
        };
        let out = analyze_loan_payment(&input).unwrap().result;
        assert_eq!(out.annual_payment, out.monthly_payment * dec!(12));
        assert!(out.balloon_balance.is_some());
        assert!(out.total_interest > dec!(10_000_000));
    }

    #[test]
    fn test_analyze_loan_payment_full_term_has_no_balloon() {
        let input = LoanPaymentInput {
            loan_amount: dec!(1_000_000),
            annual_rate: pct(dec!(6)),
            amortization_years: 25,
            loan_term_years: 25,
        };
        let out = analyze_loan_payment(&input).unwrap();
        assert!(out.result.balloon_balance.is_none());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_analyze_loan_payment_rejects_zero_amortization() {
        let input = LoanPaymentInput {
            loan_amount: dec!(1_000_000),
            annual_rate: pct(dec!(6)),
            amortization_years: 0,
            loan_term_years: 5,
        };
        match analyze_loan_payment(&input) {
            Err(CreFinanceError::InvalidInput { field, .. }) => {
                assert_eq!(field, "amortization_years")
            }
            other => panic!("Expected InvalidInput, got {:?}", other.map(|o| o.result)),
        }
    }
}
