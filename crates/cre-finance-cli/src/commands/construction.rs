use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use cre_finance_core::construction::interest_reserve::{self, ConstructionInput};
use cre_finance_core::types::Percent;

use crate::input;

/// Arguments for construction interest reserve sizing
#[derive(Args)]
pub struct ConstructionArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Total hard and soft cost budget funded by the loan
    #[arg(long)]
    pub total_budget: Option<Decimal>,

    /// Months over which the budget is drawn
    #[arg(long)]
    pub draw_months: Option<u32>,

    /// Months of lease-up after completion
    #[arg(long, default_value_t = 0)]
    pub lease_up_months: u32,

    /// Annual construction loan rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Percent of lease-up interest covered by property cash flow
    #[arg(long, default_value = "0")]
    pub lease_up_offset: Decimal,
}

pub fn run_construction(args: ConstructionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let reserve_input: ConstructionInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => ConstructionInput {
            total_budget: args
                .total_budget
                .ok_or("--total-budget is required (or provide --input)")?,
            draw_period_months: args
                .draw_months
                .ok_or("--draw-months is required (or provide --input)")?,
            lease_up_months: args.lease_up_months,
            annual_rate: Percent(args.rate.ok_or("--rate is required (or provide --input)")?),
            lease_up_offset: Percent(args.lease_up_offset),
        },
    };
    let result = interest_reserve::calculate_construction_reserve(&reserve_input)?;
    Ok(serde_json::to_value(result)?)
}
