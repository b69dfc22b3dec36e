//! Mortgage amortization and what-if simulation engine.
//!
//! Given a loan's terms history and recorded payments, the engine produces a
//! month-by-month schedule of interest, principal, fees and remaining
//! balance, overlays ephemeral what-if scenarios (rate override, recurring
//! extra payments, lump sums) and diffs scenario against baseline. All money
//! math runs in `rust_decimal::Decimal`; every invocation is pure and reads
//! its inputs once, so results are reproducible and calls can run
//! concurrently without coordination.

pub mod day_count;
pub mod engine;
pub mod error;
pub mod payments;
pub mod period;
pub mod scenario;
pub mod schedule;
pub mod simulation;
pub mod store;
pub mod summary;
pub mod terms;
pub mod types;

pub use error::MortgageError;
pub use period::PeriodKey;
pub use types::*;

/// Standard result type for all engine operations
pub type MortgageResult<T> = Result<T, MortgageError>;
