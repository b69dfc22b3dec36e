use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::scenario::{ExtraOverlay, InterestOverride, LumpSum, OverrideMode, Scenario};

use crate::input;

/// Arguments for a what-if simulation
#[derive(Args)]
pub struct SimulateArgs {
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

    /// Path to a scenario JSON file (overrides the inline flags below)
    #[arg(long)]
    pub scenario: Option<String>,

    /// Override the annual rate (percent) from the horizon start
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Apply the rate override from this period instead (YYYY-MM)
    #[arg(long)]
    pub rate_from: Option<String>,

    /// Recurring extra principal per month
    #[arg(long)]
    pub monthly_extra: Option<Decimal>,

    /// Apply the monthly extra from this period instead (YYYY-MM)
    #[arg(long)]
    pub extra_from: Option<String>,

    /// One-off lump sum as PERIOD=AMOUNT, e.g. 2027-06=100000 (repeatable)
    #[arg(long = "lump", value_name = "PERIOD=AMOUNT")]
    pub lumps: Vec<String>,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let store = input::load_portfolio(args.input.as_deref())?;
    let scenario = build_scenario(&args)?;
    let output = mortgage_core::engine::simulate(
        &store,
        &args.mortgage,
        &args.from,
        args.months,
        &scenario,
    )?;
    Ok(serde_json::to_value(output)?)
}

fn build_scenario(args: &SimulateArgs) -> Result<Scenario, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.scenario {
        return input::read_json(path);
    }

    let interest = args.rate.map(|annual_rate_pct| InterestOverride {
        mode: OverrideMode::Override,
        annual_rate_pct,
        from_period_key: args.rate_from.clone(),
    });

    let lump_sums = args
        .lumps
        .iter()
        .map(|spec| parse_lump(spec))
        .collect::<Result<Vec<_>, _>>()?;

    let extra = if args.monthly_extra.is_some() || !lump_sums.is_empty() {
        Some(ExtraOverlay {
            monthly_extra: args.monthly_extra,
            from_period_key: args.extra_from.clone(),
            lump_sums,
        })
    } else {
        None
    };

    Ok(Scenario { interest, extra })
}

fn parse_lump(spec: &str) -> Result<LumpSum, Box<dyn std::error::Error>> {
    let (period, amount) = spec
        .split_once('=')
        .ok_or_else(|| format!("--lump expects PERIOD=AMOUNT, got '{spec}'"))?;
    Ok(LumpSum {
        period_key: period.trim().to_string(),
        amount: amount.trim().parse::<Decimal>()?,
    })
}
