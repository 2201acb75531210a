use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use cre_finance_core::returns::irr::{self, IrrInput};

use crate::input;

/// Arguments for levered IRR and equity multiple
#[derive(Args)]
pub struct IrrArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Equity invested at acquisition
    #[arg(long)]
    pub initial_investment: Option<Decimal>,

    /// Annual cash flows to equity (comma-separated, e.g. "80000,82000,84000")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Net sale proceeds, received with the final cash flow
    #[arg(long, default_value = "0")]
    pub exit_proceeds: Decimal,
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let irr_input: IrrInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => IrrInput {
            initial_investment: args
                .initial_investment
                .ok_or("--initial-investment is required (or provide --input)")?,
            cash_flows: args
                .cash_flows
                .ok_or("--cash-flows is required (or provide --input)")?,
            exit_proceeds: args.exit_proceeds,
        },
    };
    let result = irr::calculate_irr(&irr_input)?;
    Ok(serde_json::to_value(result)?)
}
