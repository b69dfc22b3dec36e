//! The two operations consumed by the outer layer.
//!
//! `get_plan` produces the baseline schedule and its summary; `simulate`
//! overlays a scenario and diffs it against the baseline over the same
//! window. Input validation happens before the store is touched, and the
//! store is read exactly once per operation.

use std::time::Instant;

use serde_json::json;
use tracing::debug;

use crate::error::MortgageError;
use crate::period::PeriodKey;
use crate::scenario::Scenario;
use crate::schedule::ScheduleConfig;
use crate::simulation::{self, CompareWindow, Comparison, PlanDiff};
use crate::store::{MortgageRecords, MortgageStore};
use crate::summary::{self, PlanSummary};
use crate::terms;
use crate::types::{with_metadata, ComputationOutput, ScheduleRow};
use crate::MortgageResult;

use serde::{Deserialize, Serialize};

/// Baseline rows and their summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOutput {
    pub rows: Vec<ScheduleRow>,
    pub summary: PlanSummary,
}

/// Scenario rows and summary, plus the baseline and the diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub baseline_rows: Vec<ScheduleRow>,
    pub scenario_rows: Vec<ScheduleRow>,
    pub baseline_summary: PlanSummary,
    pub scenario_summary: PlanSummary,
    pub diff: PlanDiff,
}

/// Baseline plan for a stored mortgage.
pub fn get_plan(
    store: &impl MortgageStore,
    mortgage_id: &str,
    from_period: &str,
    months: u32,
) -> MortgageResult<ComputationOutput<PlanOutput>> {
    let from = validate_window(from_period, months)?;
    let records = store.load(mortgage_id)?;
    plan_for_records(&records, from, months)
}

/// Baseline plan against an already-loaded snapshot of records.
pub fn plan_for_records(
    records: &MortgageRecords,
    from: PeriodKey,
    months: u32,
) -> MortgageResult<ComputationOutput<PlanOutput>> {
    let start = Instant::now();
    debug!(mortgage_id = %records.mortgage.id, %from, months, "computing baseline plan");

    let warnings = anomaly_warnings(records);
    let config = ScheduleConfig::default();
    let rows = crate::schedule::generate_with_config(records, from, months, None, &config)?;
    let summary = summary::summarize(&rows);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Actual-day mortgage amortization (baseline plan)",
        &assumptions(records, from, months, &config),
        warnings,
        elapsed,
        PlanOutput { rows, summary },
    ))
}

/// What-if simulation for a stored mortgage.
pub fn simulate(
    store: &impl MortgageStore,
    mortgage_id: &str,
    from_period: &str,
    months: u32,
    scenario: &Scenario,
) -> MortgageResult<ComputationOutput<SimulationOutput>> {
    let from = validate_window(from_period, months)?;
    let records = store.load(mortgage_id)?;
    simulate_for_records(&records, from, months, scenario)
}

/// What-if simulation against an already-loaded snapshot of records.
pub fn simulate_for_records(
    records: &MortgageRecords,
    from: PeriodKey,
    months: u32,
    scenario: &Scenario,
) -> MortgageResult<ComputationOutput<SimulationOutput>> {
    let start = Instant::now();
    debug!(mortgage_id = %records.mortgage.id, %from, months, "running what-if simulation");

    let warnings = anomaly_warnings(records);
    let config = ScheduleConfig::default();
    let window = CompareWindow { from, months };
    let Comparison {
        baseline_rows,
        scenario_rows,
        baseline_summary,
        scenario_summary,
        diff,
    } = simulation::compare(records, window, window, scenario, &config)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Mortgage what-if simulation (baseline vs scenario)",
        &assumptions(records, from, months, &config),
        warnings,
        elapsed,
        SimulationOutput {
            baseline_rows,
            scenario_rows,
            baseline_summary,
            scenario_summary,
            diff,
        },
    ))
}

fn validate_window(from_period: &str, months: u32) -> MortgageResult<PeriodKey> {
    let from: PeriodKey = from_period.parse()?;
    if months == 0 {
        return Err(MortgageError::InvalidInput {
            field: "months".into(),
            reason: "horizon must cover at least one month".into(),
        });
    }
    Ok(from)
}

fn anomaly_warnings(records: &MortgageRecords) -> Vec<String> {
    terms::duplicate_effective_periods(&records.terms)
        .into_iter()
        .map(|period| {
            format!("Terms history has more than one snapshot effective at {period}; the last recorded snapshot wins")
        })
        .collect()
}

fn assumptions(
    records: &MortgageRecords,
    from: PeriodKey,
    months: u32,
    config: &ScheduleConfig,
) -> serde_json::Value {
    json!({
        "mortgage_id": records.mortgage.id,
        "from_period": from.to_string(),
        "months": months,
        "clamp_order": config.clamp_order,
        "installment": "level annuity at the nominal monthly rate, re-leveled on rate changes",
        "interest_accrual": "actual days over the snapshot day basis, rounded half-to-even",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ExtraOverlay;
    use crate::store::InMemoryStore;
    use crate::types::{Currency, Mortgage, TermsSnapshot};
    use rust_decimal_macros::dec;

    fn key(s: &str) -> PeriodKey {
        s.parse().unwrap()
    }

    fn store_with_standard_mortgage() -> InMemoryStore {
        let records = MortgageRecords {
            mortgage: Mortgage {
                id: "m1".into(),
                title: "Flat".into(),
                principal: dec!(2000000),
                origination: key("2026-01"),
                term_months: 360,
                currency: Currency::USD,
            },
            terms: vec![TermsSnapshot {
                effective_from: key("2026-01"),
                annual_rate_pct: dec!(5.0),
                fee: dec!(0),
                day_basis: 365,
            }],
            payments: vec![],
        };
        InMemoryStore::from_records(vec![records])
    }

    #[test]
    fn test_get_plan_returns_rows_and_summary() {
        let store = store_with_standard_mortgage();
        let output = get_plan(&store, "m1", "2026-01", 12).unwrap();
        let plan = &output.result;
        assert_eq!(plan.rows.len(), 12);
        assert_eq!(plan.summary.payoff_month_index, 12);
        assert_eq!(plan.rows[0].interest, dec!(8493.15));
        assert!(output.methodology.contains("amortization"));
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_malformed_from_period_rejected_before_load() {
        // The period check fires even though the store is empty: validation
        // precedes the read.
        let store = InMemoryStore::new();
        let result = get_plan(&store, "m1", "2026-1", 12);
        assert!(matches!(result, Err(MortgageError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_unknown_mortgage_is_not_found() {
        let store = store_with_standard_mortgage();
        let result = get_plan(&store, "purged", "2026-01", 12);
        assert!(matches!(result, Err(MortgageError::NotFound { .. })));
    }

    #[test]
    fn test_simulate_reports_diff() {
        let store = store_with_standard_mortgage();
        let scenario = Scenario {
            interest: None,
            extra: Some(ExtraOverlay {
                monthly_extra: Some(dec!(20000)),
                from_period_key: None,
                lump_sums: vec![],
            }),
        };
        let output = simulate(&store, "m1", "2026-01", 360, &scenario).unwrap();
        let sim = &output.result;
        assert!(sim.diff.months_saved > 0);
        assert!(sim.diff.interest_saved > dec!(0));
        assert_eq!(sim.baseline_rows.len(), sim.scenario_rows.len());
    }

    #[test]
    fn test_duplicate_snapshots_surface_as_warnings() {
        let mut store = store_with_standard_mortgage();
        let mut records = store.load("m1").unwrap();
        records.terms.push(TermsSnapshot {
            effective_from: key("2026-01"),
            annual_rate_pct: dec!(4.9),
            fee: dec!(0),
            day_basis: 365,
        });
        store.insert(records);

        let output = get_plan(&store, "m1", "2026-01", 12).unwrap();
        assert_eq!(output.warnings.len(), 1);
        assert!(output.warnings[0].contains("2026-01"));
        // The later snapshot won.
        assert_eq!(output.result.rows[0].nominal_rate_pct, dec!(4.9));
    }
}
