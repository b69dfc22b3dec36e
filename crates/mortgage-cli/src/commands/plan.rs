use clap::Args;
use serde_json::Value;

use crate::input;

/// Arguments for the baseline plan
#[derive(Args)]
pub struct PlanArgs {
    /// Path to a portfolio JSON file (or pipe it via stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Mortgage id inside the portfolio
    #[arg(long)]
    pub mortgage: String,

    /// First period of the horizon (YYYY-MM)
    #[arg(long)]
    pub from: String,

    /// Number of months to project
    #[arg(long)]
    pub months: u32,
}

pub fn run_plan(args: PlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let store = input::load_portfolio(args.input.as_deref())?;
    let output =
        mortgage_core::engine::get_plan(&store, &args.mortgage, &args.from, args.months)?;
    Ok(serde_json::to_value(output)?)
}
