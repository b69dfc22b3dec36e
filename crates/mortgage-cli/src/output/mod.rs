pub mod csv_out;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Column order for schedule rows in table and CSV output. serde_json maps
/// are alphabetical, so the order is fixed here instead.
pub const ROW_COLUMNS: [&str; 11] = [
    "period",
    "days",
    "day_basis",
    "nominal_rate_pct",
    "balance_start",
    "interest",
    "fee",
    "principal",
    "extra_principal",
    "payment_total",
    "balance_end",
];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => print_minimal(value),
    }
}

/// Pretty-print JSON to stdout.
fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// Print just the headline numbers: the diff for simulations, the summary
/// for plans.
fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(diff) = result.get("diff") {
        for key in ["months_saved", "interest_saved", "total_paid_delta"] {
            if let Some(v) = diff.get(key) {
                println!("{key}: {}", scalar(v));
            }
        }
        return;
    }

    if let Some(summary) = result.get("summary") {
        for key in [
            "payoff_month_index",
            "total_interest",
            "total_paid",
            "final_remaining",
        ] {
            if let Some(v) = summary.get(key) {
                println!("{key}: {}", scalar(v));
            }
        }
        return;
    }

    println!("{}", scalar(result));
}

/// Render a JSON leaf without quotes.
pub fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
