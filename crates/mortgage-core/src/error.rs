use thiserror::Error;

use crate::period::PeriodKey;

#[derive(Debug, Error)]
pub enum MortgageError {
    #[error("Invalid period '{key}': {reason}")]
    InvalidPeriod { key: String, reason: String },

    #[error("No terms snapshot in effect at {period}")]
    NoTermsForPeriod { period: PeriodKey },

    #[error("Invalid scenario period key '{key}': {reason}")]
    InvalidPeriodKey { key: String, reason: String },

    #[error(
        "Incomparable horizons: baseline {baseline_from} x {baseline_months} \
         vs scenario {scenario_from} x {scenario_months}"
    )]
    IncomparableHorizons {
        baseline_from: PeriodKey,
        baseline_months: u32,
        scenario_from: PeriodKey,
        scenario_months: u32,
    },

    #[error("Unknown mortgage: {mortgage_id}")]
    NotFound { mortgage_id: String },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for MortgageError {
    fn from(e: serde_json::Error) -> Self {
        MortgageError::SerializationError(e.to_string())
    }
}
