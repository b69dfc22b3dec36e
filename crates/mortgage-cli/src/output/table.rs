use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{scalar, ROW_COLUMNS};

/// Format output as tables: the schedule itself, then the summary (and the
/// diff for simulations), then warnings and methodology like every other
/// command envelope.
pub fn print_table(value: &Value) {
    let envelope = match value.as_object() {
        Some(map) => map,
        None => {
            println!("{}", value);
            return;
        }
    };
    let result = envelope.get("result").unwrap_or(value);

    if let Some(rows) = result.get("rows").and_then(Value::as_array) {
        print_schedule("Schedule", rows);
        if let Some(summary) = result.get("summary") {
            print_flat("Summary", summary);
        }
    } else if let Some(rows) = result.get("scenario_rows").and_then(Value::as_array) {
        print_schedule("Scenario schedule", rows);
        if let Some(diff) = result.get("diff") {
            print_flat("Diff vs baseline", diff);
        }
        if let Some(summary) = result.get("baseline_summary") {
            print_flat("Baseline summary", summary);
        }
        if let Some(summary) = result.get("scenario_summary") {
            print_flat("Scenario summary", summary);
        }
    } else {
        print_flat("Result", result);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

fn print_schedule(title: &str, rows: &[Value]) {
    println!("{title}:");
    let mut builder = Builder::default();
    builder.push_record(ROW_COLUMNS);
    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = ROW_COLUMNS
                .iter()
                .map(|col| map.get(*col).map(scalar).unwrap_or_default())
                .collect();
            builder.push_record(record);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_flat(title: &str, value: &Value) {
    println!("\n{title}:");
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    if let Value::Object(map) = value {
        for (key, val) in map {
            builder.push_record([key.as_str(), &scalar(val)]);
        }
    }
    println!("{}", Table::from(builder));
}
