//! Baseline-vs-scenario comparison.
//!
//! Two generator runs over the same window: one without the scenario, one
//! with it. Both row sets are summarized and diffed. Window alignment is a
//! hard precondition; mismatched horizons are rejected, never truncated.

use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::period::PeriodKey;
use crate::scenario::Scenario;
use crate::schedule::{self, ScheduleConfig};
use crate::store::MortgageRecords;
use crate::summary::{self, PlanSummary};
use crate::types::{Money, ScheduleRow};
use crate::MortgageResult;

/// A run window: first period plus horizon length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareWindow {
    pub from: PeriodKey,
    pub months: u32,
}

/// What the scenario changes relative to the baseline. Positive values mean
/// the scenario is ahead (pays off sooner, costs less interest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDiff {
    pub months_saved: i64,
    pub interest_saved: Money,
    pub total_paid_delta: Money,
    pub baseline_payoff_period: Option<PeriodKey>,
    pub scenario_payoff_period: Option<PeriodKey>,
}

/// Both runs plus their summaries and the diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub baseline_rows: Vec<ScheduleRow>,
    pub scenario_rows: Vec<ScheduleRow>,
    pub baseline_summary: PlanSummary,
    pub scenario_summary: PlanSummary,
    pub diff: PlanDiff,
}

/// Run baseline and scenario over identical windows and diff the summaries.
pub fn compare(
    records: &MortgageRecords,
    baseline_window: CompareWindow,
    scenario_window: CompareWindow,
    scenario: &Scenario,
    config: &ScheduleConfig,
) -> MortgageResult<Comparison> {
    if baseline_window != scenario_window {
        return Err(MortgageError::IncomparableHorizons {
            baseline_from: baseline_window.from,
            baseline_months: baseline_window.months,
            scenario_from: scenario_window.from,
            scenario_months: scenario_window.months,
        });
    }

    let CompareWindow { from, months } = baseline_window;
    let baseline_rows = schedule::generate_with_config(records, from, months, None, config)?;
    let scenario_rows =
        schedule::generate_with_config(records, from, months, Some(scenario), config)?;

    let baseline_summary = summary::summarize(&baseline_rows);
    let scenario_summary = summary::summarize(&scenario_rows);

    // When neither run pays off inside the horizon both indexes default to
    // the horizon length, so the delta reflects relative progress.
    let diff = PlanDiff {
        months_saved: baseline_summary.payoff_month_index as i64
            - scenario_summary.payoff_month_index as i64,
        interest_saved: baseline_summary.total_interest - scenario_summary.total_interest,
        total_paid_delta: baseline_summary.total_paid - scenario_summary.total_paid,
        baseline_payoff_period: payoff_period(&baseline_rows, &baseline_summary),
        scenario_payoff_period: payoff_period(&scenario_rows, &scenario_summary),
    };

    Ok(Comparison {
        baseline_rows,
        scenario_rows,
        baseline_summary,
        scenario_summary,
        diff,
    })
}

fn payoff_period(rows: &[ScheduleRow], summary: &PlanSummary) -> Option<PeriodKey> {
    rows.get(summary.payoff_month_index).map(|r| r.period)
}
