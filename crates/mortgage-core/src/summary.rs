//! Aggregate totals over a row sequence.

use serde::{Deserialize, Serialize};

use crate::types::{Money, ScheduleRow};

/// Totals for one schedule run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Zero-based index of the first row with a zero closing balance, or the
    /// horizon length when the loan does not pay off within it.
    pub payoff_month_index: usize,
    pub total_interest: Money,
    /// Total cash out: installments plus extra principal, across all rows.
    pub total_paid: Money,
    pub final_remaining: Money,
}

/// Scan a row sequence once. Trailing zero rows after payoff contribute
/// nothing and are harmless.
pub fn summarize(rows: &[ScheduleRow]) -> PlanSummary {
    let mut total_interest = Money::ZERO;
    let mut total_paid = Money::ZERO;
    let mut payoff_month_index = rows.len();

    for (index, row) in rows.iter().enumerate() {
        total_interest += row.interest;
        total_paid += row.payment_total + row.extra_principal;
        if index < payoff_month_index && row.balance_end <= Money::ZERO {
            payoff_month_index = index;
        }
    }

    PlanSummary {
        payoff_month_index,
        total_interest,
        total_paid,
        final_remaining: rows.last().map(|r| r.balance_end).unwrap_or(Money::ZERO),
    }
}
