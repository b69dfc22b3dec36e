//! Ephemeral what-if overlays.
//!
//! A scenario never mutates stored mortgage data; it exists only for the
//! duration of one simulation call and is passed into the generator as an
//! explicit, immutable parameter. Period keys arrive as strings on the wire
//! and are validated wholesale before any row computation: a single bad key
//! rejects the whole scenario.

use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::period::PeriodKey;
use crate::types::{Money, Rate};
use crate::MortgageResult;

/// Caller-supplied what-if changes: an optional interest override and an
/// optional extra-payment overlay. An empty scenario reproduces the baseline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest: Option<InterestOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<ExtraOverlay>,
}

/// Replaces the resolved annual rate from a period forward. Fee and day basis
/// are unaffected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestOverride {
    #[serde(default)]
    pub mode: OverrideMode,
    pub annual_rate_pct: Rate,
    /// Defaults to the first period of the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_period_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideMode {
    #[default]
    Override,
}

/// Replaces the recorded extra-payment source entirely for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtraOverlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_extra: Option<Money>,
    /// Defaults to the first period of the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_period_key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lump_sums: Vec<LumpSum>,
}

/// A one-time extra principal payment scheduled for a specific period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LumpSum {
    pub period_key: String,
    pub amount: Money,
}

/// A scenario with all period keys parsed and all amounts checked.
#[derive(Debug, Clone)]
pub struct ResolvedScenario {
    pub interest: Option<ResolvedInterestOverride>,
    pub extra: Option<ResolvedExtraOverlay>,
}

#[derive(Debug, Clone)]
pub struct ResolvedInterestOverride {
    pub annual_rate_pct: Rate,
    pub from: PeriodKey,
}

#[derive(Debug, Clone)]
pub struct ResolvedExtraOverlay {
    pub monthly_extra: Money,
    pub from: PeriodKey,
    pub lump_sums: Vec<(PeriodKey, Money)>,
}

impl Scenario {
    pub fn is_empty(&self) -> bool {
        self.interest.is_none() && self.extra.is_none()
    }

    /// Validate and parse the scenario against a run starting at
    /// `default_from`. Any malformed period key fails the whole scenario
    /// with `InvalidPeriodKey`; no partial application.
    pub fn resolve(&self, default_from: PeriodKey) -> MortgageResult<ResolvedScenario> {
        let interest = match &self.interest {
            Some(ov) => {
                let from = match &ov.from_period_key {
                    Some(key) => parse_scenario_key(key)?,
                    None => default_from,
                };
                Some(ResolvedInterestOverride {
                    annual_rate_pct: ov.annual_rate_pct,
                    from,
                })
            }
            None => None,
        };

        let extra = match &self.extra {
            Some(overlay) => {
                let monthly_extra = overlay.monthly_extra.unwrap_or_default();
                if monthly_extra < Money::ZERO {
                    return Err(MortgageError::InvalidInput {
                        field: "extra.monthly_extra".into(),
                        reason: "extra payments cannot be negative".into(),
                    });
                }
                let from = match &overlay.from_period_key {
                    Some(key) => parse_scenario_key(key)?,
                    None => default_from,
                };
                let mut lump_sums = Vec::with_capacity(overlay.lump_sums.len());
                for lump in &overlay.lump_sums {
                    if lump.amount < Money::ZERO {
                        return Err(MortgageError::InvalidInput {
                            field: "extra.lump_sums.amount".into(),
                            reason: "extra payments cannot be negative".into(),
                        });
                    }
                    lump_sums.push((parse_scenario_key(&lump.period_key)?, lump.amount));
                }
                Some(ResolvedExtraOverlay {
                    monthly_extra,
                    from,
                    lump_sums,
                })
            }
            None => None,
        };

        Ok(ResolvedScenario { interest, extra })
    }
}

fn parse_scenario_key(key: &str) -> MortgageResult<PeriodKey> {
    key.parse().map_err(|e| match e {
        MortgageError::InvalidPeriod { key, reason } => {
            MortgageError::InvalidPeriodKey { key, reason }
        }
        other => other,
    })
}
