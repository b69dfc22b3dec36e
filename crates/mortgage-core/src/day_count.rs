//! Actual-days interest accrual against a configurable day basis.
//!
//! Interest for a period is `balance_start * (annual_rate_pct/100) *
//! days/day_basis`, where `days` is the actual calendar length of the month
//! and `day_basis` comes from the effective terms snapshot (360 or 365 in
//! practice). Rounding to the currency's minor units is half-to-even.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::period::PeriodKey;
use crate::types::{round_money, Money, Rate};

/// Number of calendar days in a period, leap-years included.
pub fn days_in_period(period: PeriodKey) -> u32 {
    match period.month() {
        2 => {
            if NaiveDate::from_ymd_opt(period.year(), 2, 29).is_some() {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Interest accrued on `balance` over one period.
pub fn accrue_interest(
    balance: Money,
    annual_rate_pct: Rate,
    days: u32,
    day_basis: u32,
    minor_units: u32,
) -> Money {
    let raw = balance * (annual_rate_pct / dec!(100)) * Decimal::from(days)
        / Decimal::from(day_basis);
    round_money(raw, minor_units)
}
