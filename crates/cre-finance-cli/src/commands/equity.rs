use clap::Args;
use serde_json::Value;

use cre_finance_core::equity::partner_split::{self, PartnerSplitInput};
use cre_finance_core::equity::waterfall::{self, WaterfallInput};

use crate::input;

/// Arguments for the LP/GP equity waterfall
#[derive(Args)]
pub struct WaterfallArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_waterfall(args: WaterfallArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let wf_input: WaterfallInput = input::require(args.input.as_deref(), "waterfall")?;
    let result = waterfall::calculate_equity_waterfall(&wf_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for pro-rata partner split
#[derive(Args)]
pub struct PartnerSplitArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_partner_split(args: PartnerSplitArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let split_input: PartnerSplitInput = input::require(args.input.as_deref(), "partner split")?;
    let result = partner_split::calculate_partner_split(&split_input)?;
    Ok(serde_json::to_value(result)?)
}
