use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CreFinanceError;
use crate::lending::amortization::{monthly_payment, validate_loan_terms};
use crate::types::*;
use crate::CreFinanceResult;

// ---------------------------------------------------------------------------
// Primitives
//
// Every ratio returns exactly zero when its denominator is zero. A zero DSCR
// therefore means "undefined", not "debt free".
// ---------------------------------------------------------------------------

/// Debt service coverage ratio: NOI / annual debt service.
pub fn dscr(noi: Money, annual_debt_service: Money) -> Multiple {
    if annual_debt_service.is_zero() {
        return Decimal::ZERO;
    }
    noi / annual_debt_service
}

/// Debt yield: NOI / loan amount.
pub fn debt_yield(noi: Money, loan_amount: Money) -> Rate {
    if loan_amount.is_zero() {
        return Decimal::ZERO;
    }
    noi / loan_amount
}

/// Loan-to-value: loan amount / property value.
pub fn ltv(loan_amount: Money, property_value: Money) -> Rate {
    if property_value.is_zero() {
        return Decimal::ZERO;
    }
    loan_amount / property_value
}

/// Capitalization rate: NOI / property value.
pub fn cap_rate(noi: Money, property_value: Money) -> Rate {
    if property_value.is_zero() {
        return Decimal::ZERO;
    }
    noi / property_value
}

/// Direct capitalization value: NOI / cap rate (cap rate as a decimal).
pub fn property_value_from_cap_rate(noi: Money, cap_rate: Rate) -> Money {
    if cap_rate.is_zero() {
        return Decimal::ZERO;
    }
    noi / cap_rate
}

/// First-year cash-on-cash return: pre-tax cash flow / cash invested.
pub fn cash_on_cash(annual_cash_flow: Money, cash_invested: Money) -> Rate {
    if cash_invested.is_zero() {
        return Decimal::ZERO;
    }
    annual_cash_flow / cash_invested
}

// ---------------------------------------------------------------------------
// DSCR calculator
// ---------------------------------------------------------------------------

/// Input for the DSCR calculator: a property's NOI against a proposed loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DscrInput {
    pub noi: Money,
    pub loan_amount: Money,
    pub annual_rate: Percent,
    pub amortization_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DscrOutput {
    pub dscr: Multiple,
    pub monthly_payment: Money,
    pub annual_debt_service: Money,
}

/// Prices the loan, annualizes the debt service and divides NOI by it.
pub fn analyze_dscr(input: &DscrInput) -> CreFinanceResult<ComputationOutput<DscrOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan_terms(input.loan_amount, input.annual_rate, input.amortization_years)?;

    let payment = monthly_payment(input.loan_amount, input.annual_rate, input.amortization_years);
    let annual_debt_service = payment * Decimal::from(12);
    let ratio = dscr(input.noi, annual_debt_service);

    if annual_debt_service.is_zero() {
        warnings.push("Annual debt service is zero; DSCR is undefined and reported as 0".into());
    }

    let output = DscrOutput {
        dscr: ratio,
        monthly_payment: payment,
        annual_debt_service,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt Service Coverage Ratio (NOI / Annual Debt Service)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Single-ratio calculators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtYieldInput {
    pub noi: Money,
    pub loan_amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtYieldOutput {
    pub debt_yield: Rate,
}

pub fn analyze_debt_yield(
    input: &DebtYieldInput,
) -> CreFinanceResult<ComputationOutput<DebtYieldOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_non_negative("loan_amount", input.loan_amount)?;
    if input.loan_amount.is_zero() {
        warnings.push("Loan amount is zero; debt yield reported as 0".into());
    }

    let output = DebtYieldOutput {
        debt_yield: debt_yield(input.noi, input.loan_amount),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt Yield (NOI / Loan Amount)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LtvInput {
    pub loan_amount: Money,
    pub property_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LtvOutput {
    pub ltv: Rate,
    /// Equity needed to close, floored at zero
    pub equity_required: Money,
    /// 1 - LTV
    pub equity_pct: Rate,
}

pub fn analyze_ltv(input: &LtvInput) -> CreFinanceResult<ComputationOutput<LtvOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_non_negative("loan_amount", input.loan_amount)?;
    require_non_negative("property_value", input.property_value)?;

    let ratio = ltv(input.loan_amount, input.property_value);
    if input.property_value.is_zero() {
        warnings.push("Property value is zero; LTV reported as 0".into());
    } else if ratio > Decimal::ONE {
        warnings.push(format!("Loan exceeds property value (LTV {ratio})"));
    }

    let output = LtvOutput {
        ltv: ratio,
        equity_required: (input.property_value - input.loan_amount).max(Decimal::ZERO),
        equity_pct: Decimal::ONE - ratio,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan-to-Value (Loan / Property Value)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapRateInput {
    pub noi: Money,
    pub property_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapRateOutput {
    pub cap_rate: Rate,
}

pub fn analyze_cap_rate(input: &CapRateInput) -> CreFinanceResult<ComputationOutput<CapRateOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_non_negative("property_value", input.property_value)?;
    if input.property_value.is_zero() {
        warnings.push("Property value is zero; cap rate reported as 0".into());
    }

    let output = CapRateOutput {
        cap_rate: cap_rate(input.noi, input.property_value),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Capitalization Rate (NOI / Property Value)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyValueInput {
    pub noi: Money,
    /// Market cap rate as a percentage (6.5 = 6.5%)
    pub cap_rate: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyValueOutput {
    pub property_value: Money,
    /// Value per dollar of NOI; absent when NOI is not positive
    pub price_per_noi_dollar: Option<Multiple>,
}

pub fn analyze_property_value(
    input: &PropertyValueInput,
) -> CreFinanceResult<ComputationOutput<PropertyValueOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.cap_rate.value() < Decimal::ZERO {
        return Err(CreFinanceError::invalid(
            "cap_rate",
            "Cap rate cannot be negative",
        ));
    }
    if input.cap_rate.is_zero() {
        warnings.push("Cap rate is zero; property value reported as 0".into());
    }

    let value = property_value_from_cap_rate(input.noi, input.cap_rate.to_rate());
    let price_per_noi_dollar = if input.noi > Decimal::ZERO {
        Some(value / input.noi)
    } else {
        None
    };

    let output = PropertyValueOutput {
        property_value: value,
        price_per_noi_dollar,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Direct Capitalization (NOI / Cap Rate)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashOnCashInput {
    /// Annual pre-tax cash flow
    pub annual_cash_flow: Money,
    pub cash_invested: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashOnCashOutput {
    pub cash_on_cash: Rate,
}

pub fn analyze_cash_on_cash(
    input: &CashOnCashInput,
) -> CreFinanceResult<ComputationOutput<CashOnCashOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_non_negative("cash_invested", input.cash_invested)?;
    if input.cash_invested.is_zero() {
        warnings.push("Cash invested is zero; cash-on-cash reported as 0".into());
    }

    let output = CashOnCashOutput {
        cash_on_cash: cash_on_cash(input.annual_cash_flow, input.cash_invested),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Cash-on-Cash Return (Pre-Tax Cash Flow / Cash Invested)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn require_non_negative(field: &str, value: Money) -> CreFinanceResult<()> {
    if value < Decimal::ZERO {
        return Err(CreFinanceError::invalid(field, "Value cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_dscr_scenario() {
        let ratio = dscr(dec!(750000), dec!(681435.36));
        assert!((ratio - dec!(1.10)).abs() < dec!(0.001));
    }

    #[test]
    fn test_zero_denominators_return_zero() {
        assert_eq!(dscr(dec!(750000), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(debt_yield(dec!(750000), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(ltv(dec!(7500000), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(cap_rate(dec!(500000), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(
            property_value_from_cap_rate(dec!(500000), Decimal::ZERO),
            Decimal::ZERO
        );
        assert_eq!(cash_on_cash(dec!(80000), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_zero_guard_holds_for_negative_numerators() {
        assert_eq!(dscr(dec!(-50000), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(debt_yield(dec!(-1), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_cap_rate_round_trip() {
        let noi = dec!(500000);
        let value = dec!(7500000);
        let rate = cap_rate(noi, value);
        let back = property_value_from_cap_rate(noi, rate);
        assert!((back - value).abs() < dec!(0.000001));
    }

    #[test]
    fn test_debt_yield_and_ltv() {
        assert_eq!(debt_yield(dec!(750000), dec!(8000000)), dec!(0.09375));
        assert_eq!(ltv(dec!(7500000), dec!(10000000)), dec!(0.75));
        assert_eq!(cash_on_cash(dec!(80000), dec!(1000000)), dec!(0.08));
    }

    #[test]
    fn test_analyze_dscr_prices_the_loan() {
        let input = DscrInput {
            noi: dec!(750000),
            loan_amount: dec!(10000000),
            annual_rate: Percent(dec!(5.5)),
            amortization_years: 30,
        };
        let out = analyze_dscr(&input).unwrap().result;
        assert_eq!(out.annual_debt_service, out.monthly_payment * dec!(12));
        assert!((out.dscr - dec!(1.1007)).abs() < dec!(0.001));
    }

    #[test]
    fn test_analyze_ltv_equity_floor() {
        let input = LtvInput {
            loan_amount: dec!(12000000),
            property_value: dec!(10000000),
        };
        let out = analyze_ltv(&input).unwrap();
        assert_eq!(out.result.ltv, dec!(1.2));
        assert_eq!(out.result.equity_required, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_analyze_property_value_uses_percent() {
        let input = PropertyValueInput {
            noi: dec!(500000),
            cap_rate: Percent(dec!(6.25)),
        };
        let out = analyze_property_value(&input).unwrap().result;
        assert_eq!(out.property_value, dec!(8000000));
        assert_eq!(out.price_per_noi_dollar, Some(dec!(16)));
    }

    #[test]
    fn test_analyze_cap_rate_rejects_negative_value() {
        let input = CapRateInput {
            noi: dec!(500000),
            property_value: dec!(-1),
        };
        assert!(analyze_cap_rate(&input).is_err());
    }

    #[test]
    fn test_analyze_debt_yield_zero_loan_warns() {
        let input = DebtYieldInput {
            noi: dec!(500000),
            loan_amount: Decimal::ZERO,
        };
        let out = analyze_debt_yield(&input).unwrap();
        assert_eq!(out.result.debt_yield, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_analyze_cash_on_cash() {
        let input = CashOnCashInput {
            annual_cash_flow: dec!(80000),
            cash_invested: dec!(1000000),
        };
        let out = analyze_cash_on_cash(&input).unwrap();
        assert_eq!(out.result.cash_on_cash, dec!(0.08));
        assert!(out.warnings.is_empty());
    }
}
