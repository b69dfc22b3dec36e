use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::period::PeriodKey;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as annual percentages (5.0 = 5%), matching how mortgage
/// terms are recorded.
pub type Rate = Decimal;

/// Currency code
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    GBP,
    #[default]
    USD,
    EUR,
    CHF,
    JPY,
    CAD,
    AUD,
    HKD,
    SGD,
    Other(String),
}

impl Currency {
    /// Minor-unit precision used when rounding money amounts.
    pub fn minor_units(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }
}

/// Round to a currency's minor units using round-half-to-even.
pub fn round_money(amount: Money, minor_units: u32) -> Money {
    amount.round_dp_with_strategy(minor_units, RoundingStrategy::MidpointNearestEven)
}

/// A mortgage as stored by the persistence layer. The engine only reads it;
/// changes to rate or fee arrive as appended [`TermsSnapshot`] records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mortgage {
    pub id: String,
    pub title: String,
    /// Original principal at origination.
    pub principal: Money,
    /// First period of the loan.
    pub origination: PeriodKey,
    /// Contractual term length in months.
    pub term_months: u32,
    #[serde(default)]
    pub currency: Currency,
}

/// A recorded rate/fee configuration, effective from a period onward.
///
/// Per mortgage these form an append-only sequence sorted ascending by
/// `effective_from`; no two snapshots should share an effective period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermsSnapshot {
    pub effective_from: PeriodKey,
    pub annual_rate_pct: Rate,
    /// Flat per-period servicing fee charged as part of the installment.
    pub fee: Money,
    /// Day-count denominator (e.g. 360 or 365).
    pub day_basis: u32,
}

/// Kind of a recorded payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentKind {
    /// Regular installment.
    Main,
    /// Additional principal payment.
    Extra,
}

/// A recorded actual payment against a mortgage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub period: PeriodKey,
    pub kind: PaymentKind,
    pub amount: Money,
    pub applied_date: NaiveDate,
}

/// One period of a computed schedule. Produced fresh on every call; never
/// cached, because scenario inputs vary between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub period: PeriodKey,
    /// Calendar days in the period.
    pub days: u32,
    pub day_basis: u32,
    pub nominal_rate_pct: Rate,
    pub balance_start: Money,
    pub interest: Money,
    pub fee: Money,
    pub principal: Money,
    pub extra_principal: Money,
    /// Cash charged for the regular installment this period
    /// (interest + fee + principal after clamping; excludes extra principal).
    pub payment_total: Money,
    pub balance_end: Money,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_to_even() {
        assert_eq!(round_money(dec!(8493.1506849), 2), dec!(8493.15));
        assert_eq!(round_money(dec!(2.345), 2), dec!(2.34));
        assert_eq!(round_money(dec!(2.355), 2), dec!(2.36));
        assert_eq!(round_money(dec!(100.5), 0), dec!(100));
    }

    #[test]
    fn test_currency_minor_units() {
        assert_eq!(Currency::USD.minor_units(), 2);
        assert_eq!(Currency::JPY.minor_units(), 0);
        assert_eq!(Currency::Other("DKK".into()).minor_units(), 2);
    }
}
