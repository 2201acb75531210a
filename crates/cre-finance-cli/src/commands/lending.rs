use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use cre_finance_core::lending::amortization::{self, LoanPaymentInput};
use cre_finance_core::lending::blended_rate::{self, BlendedRateInput, LoanTranche};
use cre_finance_core::lending::ratios::{
    self, CapRateInput, CashOnCashInput, DebtYieldInput, DscrInput, LtvInput, PropertyValueInput,
};
use cre_finance_core::lending::refinance::{self, RefinanceInput};
use cre_finance_core::lending::sizing::{self, MaxLoanInput};
use cre_finance_core::types::Percent;

use crate::input;

const DEFAULT_AMORTIZATION_YEARS: u32 = 30;
const DEFAULT_TARGET_DSCR: Decimal = dec!(1.25);

/// Arguments for the loan payment calculator
#[derive(Args)]
pub struct LoanPaymentArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 5.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Amortization period in years
    #[arg(long, default_value_t = DEFAULT_AMORTIZATION_YEARS)]
    pub amortization_years: u32,

    /// Loan term in years (defaults to the amortization period)
    #[arg(long)]
    pub term_years: Option<u32>,
}

pub fn run_loan_payment(args: LoanPaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input: LoanPaymentInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => LoanPaymentInput {
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            annual_rate: Percent(args.rate.ok_or("--rate is required (or provide --input)")?),
            amortization_years: args.amortization_years,
            loan_term_years: args.term_years.unwrap_or(args.amortization_years),
        },
    };
    let result = amortization::analyze_loan_payment(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for DSCR calculation
#[derive(Args)]
pub struct DscrArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Net operating income (annual)
    #[arg(long)]
    pub noi: Option<Decimal>,

    /// Loan principal
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Amortization period in years
    #[arg(long, default_value_t = DEFAULT_AMORTIZATION_YEARS)]
    pub amortization_years: u32,
}

pub fn run_dscr(args: DscrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dscr_input: DscrInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => DscrInput {
            noi: args.noi.ok_or("--noi is required (or provide --input)")?,
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            annual_rate: Percent(args.rate.ok_or("--rate is required (or provide --input)")?),
            amortization_years: args.amortization_years,
        },
    };
    let result = ratios::analyze_dscr(&dscr_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for loan sizing from a target DSCR
#[derive(Args)]
pub struct MaxLoanArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Net operating income (annual)
    #[arg(long)]
    pub noi: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Amortization period in years
    #[arg(long, default_value_t = DEFAULT_AMORTIZATION_YEARS)]
    pub amortization_years: u32,

    /// Minimum coverage required by the lender (defaults to 1.25)
    #[arg(long)]
    pub target_dscr: Option<Decimal>,
}

pub fn run_max_loan(args: MaxLoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sizing_input: MaxLoanInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => MaxLoanInput {
            noi: args.noi.ok_or("--noi is required (or provide --input)")?,
            annual_rate: Percent(args.rate.ok_or("--rate is required (or provide --input)")?),
            amortization_years: args.amortization_years,
            target_dscr: args.target_dscr.unwrap_or(DEFAULT_TARGET_DSCR),
        },
    };
    let result = sizing::calculate_max_loan(&sizing_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for debt yield
#[derive(Args)]
pub struct DebtYieldArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Net operating income (annual)
    #[arg(long)]
    pub noi: Option<Decimal>,

    /// Loan principal
    #[arg(long)]
    pub loan_amount: Option<Decimal>,
}

pub fn run_debt_yield(args: DebtYieldArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dy_input: DebtYieldInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => DebtYieldInput {
            noi: args.noi.ok_or("--noi is required (or provide --input)")?,
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
        },
    };
    let result = ratios::analyze_debt_yield(&dy_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for loan-to-value
#[derive(Args)]
pub struct LtvArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Appraised or purchase value
    #[arg(long)]
    pub property_value: Option<Decimal>,
}

pub fn run_ltv(args: LtvArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ltv_input: LtvInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => LtvInput {
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            property_value: args
                .property_value
                .ok_or("--property-value is required (or provide --input)")?,
        },
    };
    let result = ratios::analyze_ltv(&ltv_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for cap rate
#[derive(Args)]
pub struct CapRateArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Net operating income (annual)
    #[arg(long)]
    pub noi: Option<Decimal>,

    /// Property value
    #[arg(long)]
    pub property_value: Option<Decimal>,
}

pub fn run_cap_rate(args: CapRateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cap_input: CapRateInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => CapRateInput {
            noi: args.noi.ok_or("--noi is required (or provide --input)")?,
            property_value: args
                .property_value
                .ok_or("--property-value is required (or provide --input)")?,
        },
    };
    let result = ratios::analyze_cap_rate(&cap_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for direct capitalization
#[derive(Args)]
pub struct PropertyValueArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Net operating income (annual)
    #[arg(long)]
    pub noi: Option<Decimal>,

    /// Market cap rate in percent (e.g. 6.5)
    #[arg(long)]
    pub cap_rate: Option<Decimal>,
}

pub fn run_property_value(args: PropertyValueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let value_input: PropertyValueInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => PropertyValueInput {
            noi: args.noi.ok_or("--noi is required (or provide --input)")?,
            cap_rate: Percent(
                args.cap_rate
                    .ok_or("--cap-rate is required (or provide --input)")?,
            ),
        },
    };
    let result = ratios::analyze_property_value(&value_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for cash-on-cash return
#[derive(Args)]
pub struct CashOnCashArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Annual pre-tax cash flow after debt service
    #[arg(long, allow_hyphen_values = true)]
    pub annual_cash_flow: Option<Decimal>,

    /// Total equity invested
    #[arg(long)]
    pub cash_invested: Option<Decimal>,
}

pub fn run_cash_on_cash(args: CashOnCashArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let coc_input: CashOnCashInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => CashOnCashInput {
            annual_cash_flow: args
                .annual_cash_flow
                .ok_or("--annual-cash-flow is required (or provide --input)")?,
            cash_invested: args
                .cash_invested
                .ok_or("--cash-invested is required (or provide --input)")?,
        },
    };
    let result = ratios::analyze_cash_on_cash(&coc_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for blended rate across a capital stack
#[derive(Args)]
pub struct BlendedRateArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Tranche amounts (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub amounts: Option<Vec<Decimal>>,

    /// Tranche rates in percent (comma-separated, same order as --amounts)
    #[arg(long, value_delimiter = ',')]
    pub rates: Option<Vec<Decimal>>,

    /// Origination points per tranche in percent (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub points: Option<Vec<Decimal>>,

    /// Term in months over which points are amortized
    #[arg(long, default_value_t = 120)]
    pub term_months: u32,
}

pub fn run_blended_rate(args: BlendedRateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let blend_input: BlendedRateInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => {
            let amounts = args
                .amounts
                .ok_or("--amounts is required (or provide --input)")?;
            let rates = args.rates.ok_or("--rates is required (or provide --input)")?;
            if amounts.len() != rates.len() {
                return Err(format!(
                    "--amounts has {} values but --rates has {}",
                    amounts.len(),
                    rates.len()
                )
                .into());
            }
            let points = args.points.unwrap_or_default();
            let tranches = amounts
                .into_iter()
                .zip(rates)
                .enumerate()
                .map(|(i, (amount, rate))| LoanTranche {
                    amount,
                    rate: Percent(rate),
                    points: points.get(i).copied().map(Percent),
                })
                .collect();
            BlendedRateInput {
                tranches,
                term_months: args.term_months,
            }
        }
    };
    let result = blended_rate::calculate_blended_rate(&blend_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for refinance analysis
#[derive(Args)]
pub struct RefinanceArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding balance on the existing loan
    #[arg(long)]
    pub current_balance: Option<Decimal>,

    /// Existing loan rate in percent
    #[arg(long)]
    pub current_rate: Option<Decimal>,

    /// Years remaining on the existing amortization
    #[arg(long)]
    pub current_remaining_years: Option<u32>,

    /// New loan amount (defaults to the current balance)
    #[arg(long)]
    pub new_amount: Option<Decimal>,

    /// New loan rate in percent
    #[arg(long)]
    pub new_rate: Option<Decimal>,

    /// New amortization period in years
    #[arg(long, default_value_t = DEFAULT_AMORTIZATION_YEARS)]
    pub new_amort_years: u32,

    /// Closing costs of the refinance
    #[arg(long, default_value = "0")]
    pub closing_costs: Decimal,
}

pub fn run_refinance(args: RefinanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let refi_input: RefinanceInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => {
            let current_balance = args
                .current_balance
                .ok_or("--current-balance is required (or provide --input)")?;
            RefinanceInput {
                current_balance,
                current_rate: Percent(
                    args.current_rate
                        .ok_or("--current-rate is required (or provide --input)")?,
                ),
                current_remaining_years: args
                    .current_remaining_years
                    .ok_or("--current-remaining-years is required (or provide --input)")?,
                new_amount: args.new_amount.unwrap_or(current_balance),
                new_rate: Percent(
                    args.new_rate
                        .ok_or("--new-rate is required (or provide --input)")?,
                ),
                new_amort_years: args.new_amort_years,
                closing_costs: args.closing_costs,
            }
        }
    };
    let result = refinance::calculate_refinance(&refi_input)?;
    Ok(serde_json::to_value(result)?)
}
