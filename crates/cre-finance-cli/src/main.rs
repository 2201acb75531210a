mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::construction::ConstructionArgs;
use commands::equity::{PartnerSplitArgs, WaterfallArgs};
use commands::lending::{
    BlendedRateArgs, CapRateArgs, CashOnCashArgs, DebtYieldArgs, DscrArgs, LoanPaymentArgs,
    LtvArgs, MaxLoanArgs, PropertyValueArgs, RefinanceArgs,
};
use commands::returns::IrrArgs;

/// Commercial real estate underwriting calculations
#[derive(Parser)]
#[command(
    name = "cre",
    version,
    about = "Commercial real estate underwriting calculations",
    long_about = "A CLI for commercial real estate lending and investment math with \
                  decimal precision. Supports loan sizing, coverage ratios, refinance \
                  analysis, capital stack blending, levered IRR, construction interest \
                  reserves, and LP/GP equity waterfalls."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, env = "CRE_OUTPUT", default_value = "json", global = true)]
    output: OutputFormat,

    /// Log calculator internals to stderr
    #[arg(short, long, env = "CRE_VERBOSE", global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment, balloon and amortization schedule for a fixed-rate loan
    LoanPayment(LoanPaymentArgs),
    /// Debt service coverage ratio for a loan against NOI
    Dscr(DscrArgs),
    /// Maximum loan supported by NOI at a target DSCR
    MaxLoan(MaxLoanArgs),
    /// Debt yield (NOI / loan amount)
    DebtYield(DebtYieldArgs),
    /// Loan-to-value ratio and equity required
    Ltv(LtvArgs),
    /// Capitalization rate (NOI / value)
    CapRate(CapRateArgs),
    /// Property value from NOI and a market cap rate
    PropertyValue(PropertyValueArgs),
    /// Cash-on-cash return
    CashOnCash(CashOnCashArgs),
    /// Blended and all-in rate across loan tranches
    BlendedRate(BlendedRateArgs),
    /// Refinance savings and break-even
    Refinance(RefinanceArgs),
    /// Levered IRR and equity multiple with exit sensitivity
    Irr(IrrArgs),
    /// Construction loan interest reserve
    Construction(ConstructionArgs),
    /// LP/GP equity waterfall
    Waterfall(WaterfallArgs),
    /// Pro-rata partner distribution split
    PartnerSplit(PartnerSplitArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = if verbose {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(output = ?cli.output, "starting");

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::LoanPayment(args) => commands::lending::run_loan_payment(args),
        Commands::Dscr(args) => commands::lending::run_dscr(args),
        Commands::MaxLoan(args) => commands::lending::run_max_loan(args),
        Commands::DebtYield(args) => commands::lending::run_debt_yield(args),
        Commands::Ltv(args) => commands::lending::run_ltv(args),
        Commands::CapRate(args) => commands::lending::run_cap_rate(args),
        Commands::PropertyValue(args) => commands::lending::run_property_value(args),
        Commands::CashOnCash(args) => commands::lending::run_cash_on_cash(args),
        Commands::BlendedRate(args) => commands::lending::run_blended_rate(args),
        Commands::Refinance(args) => commands::lending::run_refinance(args),
        Commands::Irr(args) => commands::returns::run_irr(args),
        Commands::Construction(args) => commands::construction::run_construction(args),
        Commands::Waterfall(args) => commands::equity::run_waterfall(args),
        Commands::PartnerSplit(args) => commands::equity::run_partner_split(args),
        Commands::Version => {
            println!("cre {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
