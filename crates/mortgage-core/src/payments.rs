//! Extra-principal resolution for one period.
//!
//! With no overlay, the source of extra principal is the recorded `Extra`
//! payments. A scenario overlay replaces that source entirely for the run;
//! the two sources never combine.

use crate::period::PeriodKey;
use crate::scenario::ResolvedExtraOverlay;
use crate::types::{Money, Payment, PaymentKind};

/// Extra principal applied in `period`.
pub fn resolve_extra(
    period: PeriodKey,
    baseline: &[Payment],
    overlay: Option<&ResolvedExtraOverlay>,
) -> Money {
    match overlay {
        None => baseline
            .iter()
            .filter(|p| p.kind == PaymentKind::Extra && p.period == period)
            .map(|p| p.amount)
            .sum(),
        Some(overlay) => {
            let mut extra = Money::ZERO;
            if period >= overlay.from {
                extra += overlay.monthly_extra;
            }
            for (lump_period, amount) in &overlay.lump_sums {
                if *lump_period == period {
                    extra += *amount;
                }
            }
            extra
        }
    }
}
