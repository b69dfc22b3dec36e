//! Point-in-time resolution of rate, fee and day basis.
//!
//! Terms history is an append-only sequence of snapshots; the snapshot in
//! effect at period P is the latest one with `effective_from <= P`. Histories
//! are small per mortgage, so resolution is a linear scan.

use tracing::warn;

use crate::error::MortgageError;
use crate::period::PeriodKey;
use crate::scenario::ResolvedInterestOverride;
use crate::types::{Money, Rate, TermsSnapshot};
use crate::MortgageResult;

/// Terms in effect for one period, after any scenario override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTerms {
    pub annual_rate_pct: Rate,
    pub fee: Money,
    pub day_basis: u32,
}

/// Resolve the effective terms for `period`.
///
/// Fails with `NoTermsForPeriod` when no snapshot is in effect; every
/// mortgage must have an originating snapshot at or before its first period,
/// so this is an unrecoverable configuration error.
///
/// A scenario interest override replaces only the rate, and only for
/// `period >= override.from`.
pub fn resolve(
    snapshots: &[TermsSnapshot],
    period: PeriodKey,
    interest: Option<&ResolvedInterestOverride>,
) -> MortgageResult<ResolvedTerms> {
    // Scanning in input order and accepting `>=` makes the tie-break
    // deterministic: of several snapshots sharing an effective period, the
    // last one recorded wins.
    let mut effective: Option<&TermsSnapshot> = None;
    for snapshot in snapshots {
        if snapshot.effective_from > period {
            continue;
        }
        match effective {
            Some(current) if snapshot.effective_from < current.effective_from => {}
            _ => effective = Some(snapshot),
        }
    }

    let snapshot = effective.ok_or(MortgageError::NoTermsForPeriod { period })?;

    let mut annual_rate_pct = snapshot.annual_rate_pct;
    if let Some(ov) = interest {
        if period >= ov.from {
            annual_rate_pct = ov.annual_rate_pct;
        }
    }

    Ok(ResolvedTerms {
        annual_rate_pct,
        fee: snapshot.fee,
        day_basis: snapshot.day_basis,
    })
}

/// Effective periods shared by more than one snapshot.
///
/// Duplicates violate the append-only invariant; the resolver still picks
/// the last one in input order, but callers surface the anomaly instead of
/// ignoring it.
pub fn duplicate_effective_periods(snapshots: &[TermsSnapshot]) -> Vec<PeriodKey> {
    let mut duplicates = Vec::new();
    for (i, snapshot) in snapshots.iter().enumerate() {
        let repeated = snapshots[..i]
            .iter()
            .any(|other| other.effective_from == snapshot.effective_from);
        if repeated && !duplicates.contains(&snapshot.effective_from) {
            duplicates.push(snapshot.effective_from);
        }
    }
    if !duplicates.is_empty() {
        warn!(
            periods = %duplicates
                .iter()
                .map(PeriodKey::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            "terms history contains duplicate effective periods; last snapshot in input order wins"
        );
    }
    duplicates
}
