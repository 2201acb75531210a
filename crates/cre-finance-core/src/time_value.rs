use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::types::{Money, Rate};

/// (1 + rate)^periods, or `None` if the factor overflows.
pub(crate) fn compound_factor(rate: Rate, periods: u32) -> Option<Decimal> {
    (Decimal::ONE + rate).checked_powu(u64::from(periods))
}

/// (1 + rate)^-periods. A compound factor too large to represent underflows
/// the discount to 0; `None` only when the compound factor is 0.
pub(crate) fn discount_factor(rate: Rate, periods: u32) -> Option<Decimal> {
    match compound_factor(rate, periods) {
        Some(compound) => Decimal::ONE.checked_div(compound),
        None => Some(Decimal::ZERO),
    }
}

/// Net Present Value of a series of periodic cash flows.
///
/// `cash_flows[0]` is undiscounted. Returns `None` when the discount factor
/// degenerates (rate at or below -100%) or the sum overflows.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> Option<Money> {
    npv_and_derivative(rate, cash_flows).map(|(value, _)| value)
}

/// NPV(r) = sum CF_t / (1+r)^t and its derivative d(NPV)/dr.
///
/// Every operation is checked: an overflow or a zero divisor yields `None`,
/// which callers treat as a non-finite evaluation.
pub(crate) fn npv_and_derivative(rate: Rate, cash_flows: &[Money]) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    let mut npv = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE; // (1+r)^-0

    for (t, cf) in cash_flows.iter().enumerate() {
        npv = npv.checked_add(cf.checked_mul(discount)?)?;
        if t > 0 {
            // d/dr of CF_t / (1+r)^t = -t * CF_t / (1+r)^(t+1)
            let term = Decimal::from(t as u64)
                .checked_mul(*cf)?
                .checked_mul(discount)?
                .checked_div(one_plus_r)?;
            dnpv = dnpv.checked_sub(term)?;
        }
        discount = discount.checked_div(one_plus_r)?;
    }

    Some((npv, dnpv))
}

/// NPV and d(NPV)/dr, both multiplied by `scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScaledNpv {
    pub value: Decimal,
    pub derivative: Decimal,
    pub scale: Decimal,
}

/// NPV and its derivative in a form whose terms stay in range for any rate
/// above -100%.
///
/// Non-negative rates are evaluated directly (`scale` = 1). Negative rates
/// are multiplied through by (1+r)^T, T being the last period, so every
/// growth factor is at most 1 and (1+r)^T may underflow to 0. The Newton
/// step `value / derivative` is the same either way.
pub(crate) fn scaled_npv_and_derivative(rate: Rate, cash_flows: &[Money]) -> Option<ScaledNpv> {
    if rate >= Decimal::ZERO {
        let (value, derivative) = npv_and_derivative(rate, cash_flows)?;
        return Some(ScaledNpv {
            value,
            derivative,
            scale: Decimal::ONE,
        });
    }

    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }

    let mut value = Decimal::ZERO;
    let mut derivative = Decimal::ZERO;
    let mut growth = Decimal::ONE; // (1+r)^(T-t)

    for (t, cf) in cash_flows.iter().enumerate().rev() {
        value = value.checked_add(cf.checked_mul(growth)?)?;
        if t > 0 {
            // -t * CF_t * (1+r)^(T-t-1)
            let term = Decimal::from(t as u64)
                .checked_mul(*cf)?
                .checked_mul(growth)?
                .checked_div(one_plus_r)?;
            derivative = derivative.checked_sub(term)?;
            growth = growth.checked_mul(one_plus_r)?;
        }
    }

    Some(ScaledNpv {
        value,
        derivative,
        scale: growth,
    })
}
