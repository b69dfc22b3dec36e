mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::plan::PlanArgs;
use commands::simulate::SimulateArgs;

/// Deterministic mortgage schedules and what-if simulations
#[derive(Parser)]
#[command(
    name = "msim",
    version,
    about = "Deterministic mortgage schedules and what-if simulations",
    long_about = "Produces month-by-month mortgage amortization schedules with \
                  decimal precision from a loan's recorded terms history and \
                  payments, and simulates what-if scenarios (rate override, \
                  recurring extra payments, lump sums) diffed against the \
                  baseline plan."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce the baseline schedule and summary for a mortgage
    Plan(PlanArgs),
    /// Overlay a what-if scenario and diff it against the baseline
    Simulate(SimulateArgs),
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

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Plan(args) => commands::plan::run_plan(args),
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Version => {
            println!("msim {}", env!("CARGO_PKG_VERSION"));
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
