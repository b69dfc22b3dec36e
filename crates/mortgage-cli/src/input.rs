//! Portfolio and scenario input loading.
//!
//! Commands accept a portfolio JSON file via `--input` or piped on stdin:
//! the stored records (mortgage, terms history, payments) for one or more
//! mortgages, loaded wholesale into an in-memory store before the engine
//! runs.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use mortgage_core::store::{InMemoryStore, MortgageRecords};

/// Portfolio file shape.
#[derive(Debug, Deserialize)]
pub struct Portfolio {
    pub mortgages: Vec<MortgageRecords>,
}

/// Load a portfolio from `--input` or piped stdin into an in-memory store.
pub fn load_portfolio(path: Option<&str>) -> Result<InMemoryStore, Box<dyn std::error::Error>> {
    let portfolio: Portfolio = if let Some(path) = path {
        read_json(path)?
    } else if let Some(value) = read_stdin()? {
        serde_json::from_value(value)?
    } else {
        return Err("--input <portfolio.json> or piped stdin is required".into());
    };
    Ok(InMemoryStore::from_records(portfolio.mortgages))
}

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    if !p.is_file() {
        return Err(format!("File not found: {path}").into());
    }
    let contents =
        fs::read_to_string(p).map_err(|e| format!("Failed to read '{path}': {e}"))?;
    let value: T =
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse '{path}': {e}"))?;
    Ok(value)
}

/// Attempt to read JSON from stdin if data is being piped.
/// Returns None if stdin is a TTY (interactive).
fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    Ok(Some(serde_json::from_str(trimmed)?))
}
