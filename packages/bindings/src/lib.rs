use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use cre_finance_core::types::Percent;
use cre_finance_core::CreFinanceResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse the JSON input, run the calculator and serialize its output.
/// Malformed JSON surfaces as a serialization error.
fn run_json<I, O>(
    input_json: &str,
    calculator: impl FnOnce(&I) -> CreFinanceResult<O>,
) -> CreFinanceResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json)?;
    let output = calculator(&input)?;
    Ok(serde_json::to_string(&output)?)
}

fn parse_decimal(field: &str, raw: &str) -> NapiResult<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| to_napi_error(format!("{field}: {e}")))
}

// ---------------------------------------------------------------------------
// Lending
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_loan_payment(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        cre_finance_core::lending::amortization::analyze_loan_payment,
    )
    .map_err(to_napi_error)
}

#[napi]
pub fn analyze_dscr(input_json: String) -> NapiResult<String> {
    run_json(&input_json, cre_finance_core::lending::ratios::analyze_dscr).map_err(to_napi_error)
}

#[napi]
pub fn calculate_max_loan(input_json: String) -> NapiResult<String> {
    run_json(&input_json, cre_finance_core::lending::sizing::calculate_max_loan)
        .map_err(to_napi_error)
}

#[napi]
pub fn analyze_debt_yield(input_json: String) -> NapiResult<String> {
    run_json(&input_json, cre_finance_core::lending::ratios::analyze_debt_yield)
        .map_err(to_napi_error)
}

#[napi]
pub fn analyze_ltv(input_json: String) -> NapiResult<String> {
    run_json(&input_json, cre_finance_core::lending::ratios::analyze_ltv).map_err(to_napi_error)
}

#[napi]
pub fn analyze_cap_rate(input_json: String) -> NapiResult<String> {
    run_json(&input_json, cre_finance_core::lending::ratios::analyze_cap_rate)
        .map_err(to_napi_error)
}

#[napi]
pub fn analyze_property_value(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        cre_finance_core::lending::ratios::analyze_property_value,
    )
    .map_err(to_napi_error)
}

#[napi]
pub fn analyze_cash_on_cash(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        cre_finance_core::lending::ratios::analyze_cash_on_cash,
    )
    .map_err(to_napi_error)
}

#[napi]
pub fn calculate_blended_rate(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        cre_finance_core::lending::blended_rate::calculate_blended_rate,
    )
    .map_err(to_napi_error)
}

#[napi]
pub fn calculate_refinance(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        cre_finance_core::lending::refinance::calculate_refinance,
    )
    .map_err(to_napi_error)
}

/// Bare payment figure for form fields that recalculate on every keystroke.
/// Amounts and rates are decimal strings; the rate is an annual percentage.
#[napi]
pub fn monthly_payment(
    loan_amount: String,
    annual_rate: String,
    amortization_years: u32,
) -> NapiResult<String> {
    let loan = parse_decimal("loan_amount", &loan_amount)?;
    let rate = parse_decimal("annual_rate", &annual_rate)?;
    let payment =
        cre_finance_core::lending::amortization::monthly_payment(loan, Percent(rate), amortization_years);
    Ok(payment.to_string())
}

// ---------------------------------------------------------------------------
// Returns
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_irr(input_json: String) -> NapiResult<String> {
    run_json(&input_json, cre_finance_core::returns::irr::calculate_irr).map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct IrrSensitivityBindingInput {
    initial_investment: Decimal,
    cash_flows: Vec<Decimal>,
    exit_proceeds: Decimal,
}

#[napi]
pub fn irr_sensitivity(input_json: String) -> NapiResult<String> {
    let binding_input: IrrSensitivityBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let curve = cre_finance_core::returns::irr::irr_sensitivity(
        binding_input.initial_investment,
        &binding_input.cash_flows,
        binding_input.exit_proceeds,
    );
    serde_json::to_string(&curve).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_construction_reserve(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        cre_finance_core::construction::interest_reserve::calculate_construction_reserve,
    )
    .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Equity
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_equity_waterfall(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        cre_finance_core::equity::waterfall::calculate_equity_waterfall,
    )
    .map_err(to_napi_error)
}

#[napi]
pub fn calculate_partner_split(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        cre_finance_core::equity::partner_split::calculate_partner_split,
    )
    .map_err(to_napi_error)
}
