use serde_json::Value;
use std::io;

use super::{scalar, ROW_COLUMNS};

/// Write output as CSV to stdout.
///
/// Schedules become one CSV line per period; simulations carry a leading
/// `run` column distinguishing baseline from scenario rows. Anything else
/// degrades to field,value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(rows) = result.get("rows").and_then(Value::as_array) {
        write_schedule(&mut wtr, &[("baseline", rows)]);
    } else if let (Some(baseline), Some(scenario)) = (
        result.get("baseline_rows").and_then(Value::as_array),
        result.get("scenario_rows").and_then(Value::as_array),
    ) {
        write_schedule(&mut wtr, &[("baseline", baseline), ("scenario", scenario)]);
    } else if let Value::Object(map) = result {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            let _ = wtr.write_record([key.as_str(), &scalar(val)]);
        }
    } else {
        let _ = wtr.write_record([&scalar(result)]);
    }

    let _ = wtr.flush();
}

fn write_schedule(wtr: &mut csv::Writer<io::StdoutLock<'_>>, runs: &[(&str, &[Value])]) {
    let mut header = vec!["run"];
    header.extend(ROW_COLUMNS);
    let _ = wtr.write_record(&header);

    for (run, rows) in runs {
        for row in *rows {
            if let Value::Object(map) = row {
                let mut record = vec![run.to_string()];
                record.extend(
                    ROW_COLUMNS
                        .iter()
                        .map(|col| map.get(*col).map(scalar).unwrap_or_default()),
                );
                let _ = wtr.write_record(&record);
            }
        }
    }
}
