//! The schedule generator.
//!
//! One state per period, `months` transitions. Each period resolves terms
//! and extra payments, accrues actual-day interest, applies the scheduled
//! installment and emits one row. Any resolver error aborts the whole
//! generation; no partial row sequence is ever returned.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::day_count;
use crate::error::MortgageError;
use crate::payments;
use crate::period::PeriodKey;
use crate::scenario::{ResolvedScenario, Scenario};
use crate::store::MortgageRecords;
use crate::terms;
use crate::types::{round_money, Money, Rate, ScheduleRow};
use crate::MortgageResult;

/// How to attribute the final balance reduction when the regular and extra
/// principal together overshoot the remaining balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClampOrder {
    /// Regular principal keeps priority; extra principal absorbs the cut.
    #[default]
    RegularFirst,
    /// Both are scaled by the same factor.
    Proportional,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleConfig {
    pub clamp_order: ClampOrder,
}

/// Generate `months` rows starting at `from`, with an optional scenario
/// overlaid on the stored terms and payments.
pub fn generate(
    records: &MortgageRecords,
    from: PeriodKey,
    months: u32,
    scenario: Option<&Scenario>,
) -> MortgageResult<Vec<ScheduleRow>> {
    generate_with_config(records, from, months, scenario, &ScheduleConfig::default())
}

pub fn generate_with_config(
    records: &MortgageRecords,
    from: PeriodKey,
    months: u32,
    scenario: Option<&Scenario>,
    config: &ScheduleConfig,
) -> MortgageResult<Vec<ScheduleRow>> {
    validate_records(records)?;
    if months == 0 {
        return Err(MortgageError::InvalidInput {
            field: "months".into(),
            reason: "horizon must cover at least one month".into(),
        });
    }
    let pre_roll = records.mortgage.origination.months_until(from);
    if pre_roll < 0 {
        return Err(MortgageError::InvalidInput {
            field: "from_period".into(),
            reason: format!(
                "horizon starts before origination ({})",
                records.mortgage.origination
            ),
        });
    }

    // Scenario validation is wholesale and happens before any row math.
    let resolved = scenario.map(|s| s.resolve(from)).transpose()?;
    let resolved = resolved.as_ref();

    let mut state = ScheduleState::new(records, config);
    let mut period = records.mortgage.origination;

    // Replay recorded history up to the horizon start so the first row opens
    // on the outstanding principal as of the period immediately before it.
    for _ in 0..pre_roll {
        state.step(period, None)?;
        period = period.next();
    }

    let mut rows = Vec::with_capacity(months as usize);
    for _ in 0..months {
        rows.push(state.step(period, resolved)?);
        period = period.next();
    }
    Ok(rows)
}

fn validate_records(records: &MortgageRecords) -> MortgageResult<()> {
    if records.mortgage.principal <= Money::ZERO {
        return Err(MortgageError::InvalidInput {
            field: "mortgage.principal".into(),
            reason: "principal must be positive".into(),
        });
    }
    if records.mortgage.term_months == 0 {
        return Err(MortgageError::InvalidInput {
            field: "mortgage.term_months".into(),
            reason: "term must cover at least one month".into(),
        });
    }
    for snapshot in &records.terms {
        if snapshot.day_basis == 0 {
            return Err(MortgageError::InvalidInput {
                field: "terms.day_basis".into(),
                reason: "day basis must be positive".into(),
            });
        }
        if snapshot.fee < Money::ZERO {
            return Err(MortgageError::InvalidInput {
                field: "terms.fee".into(),
                reason: "fee cannot be negative".into(),
            });
        }
    }
    for payment in &records.payments {
        if payment.amount < Money::ZERO {
            return Err(MortgageError::InvalidInput {
                field: "payments.amount".into(),
                reason: "recorded payments cannot be negative".into(),
            });
        }
    }
    Ok(())
}

struct ScheduleState<'a> {
    records: &'a MortgageRecords,
    config: &'a ScheduleConfig,
    minor_units: u32,
    balance: Money,
    /// Scheduled installment (interest + principal portion, fee excluded).
    scheduled: Option<Money>,
    prev_rate: Option<Rate>,
}

impl<'a> ScheduleState<'a> {
    fn new(records: &'a MortgageRecords, config: &'a ScheduleConfig) -> Self {
        ScheduleState {
            records,
            config,
            minor_units: records.mortgage.currency.minor_units(),
            balance: records.mortgage.principal,
            scheduled: None,
            prev_rate: None,
        }
    }

    fn step(
        &mut self,
        period: PeriodKey,
        scenario: Option<&ResolvedScenario>,
    ) -> MortgageResult<ScheduleRow> {
        let terms = terms::resolve(
            &self.records.terms,
            period,
            scenario.and_then(|s| s.interest.as_ref()),
        )?;
        let days = day_count::days_in_period(period);

        // Terminal state: the loan is paid off. Keep the calendar facts,
        // zero the money, skip the interest/payment math.
        if self.balance.is_zero() {
            return Ok(ScheduleRow {
                period,
                days,
                day_basis: terms.day_basis,
                nominal_rate_pct: terms.annual_rate_pct,
                balance_start: Money::ZERO,
                interest: Money::ZERO,
                fee: Money::ZERO,
                principal: Money::ZERO,
                extra_principal: Money::ZERO,
                payment_total: Money::ZERO,
                balance_end: Money::ZERO,
            });
        }

        let balance_start = self.balance;
        let rate = terms.annual_rate_pct;

        // The installment is constant until the resolved rate changes:
        // origination, a recorded terms change and a scenario override
        // kicking in all re-level the annuity over the remaining term.
        let scheduled = match self.scheduled {
            Some(p) if self.prev_rate == Some(rate) => p,
            _ => {
                let elapsed = self.records.mortgage.origination.months_until(period);
                let remaining = i64::from(self.records.mortgage.term_months) - elapsed;
                let p = annuity_payment(balance_start, rate, remaining, self.minor_units);
                self.scheduled = Some(p);
                self.prev_rate = Some(rate);
                p
            }
        };

        let interest =
            day_count::accrue_interest(balance_start, rate, days, terms.day_basis, self.minor_units);
        let fee = terms.fee;

        // principal = payment_total - interest - fee, floored at zero;
        // `scheduled` already excludes the fee.
        let mut principal = scheduled - interest;
        if principal < Money::ZERO {
            principal = Money::ZERO;
        }

        let mut extra_principal = payments::resolve_extra(
            period,
            &self.records.payments,
            scenario.and_then(|s| s.extra.as_ref()),
        );

        let reduction = principal + extra_principal;
        if reduction > balance_start {
            match self.config.clamp_order {
                ClampOrder::RegularFirst => {
                    principal = principal.min(balance_start);
                    extra_principal = extra_principal.min(balance_start - principal);
                }
                ClampOrder::Proportional => {
                    let scale = balance_start / reduction;
                    principal =
                        round_money(principal * scale, self.minor_units).min(balance_start);
                    extra_principal = balance_start - principal;
                }
            }
        }

        let balance_end = balance_start - principal - extra_principal;
        let payment_total = interest + fee + principal;
        self.balance = balance_end;

        Ok(ScheduleRow {
            period,
            days,
            day_basis: terms.day_basis,
            nominal_rate_pct: rate,
            balance_start,
            interest,
            fee,
            principal,
            extra_principal,
            payment_total,
            balance_end,
        })
    }
}

/// Level installment (interest + principal portion) amortizing `balance`
/// over `remaining` months at the nominal monthly rate. Past the end of the
/// term the installment clears the balance in one month.
fn annuity_payment(balance: Money, annual_rate_pct: Rate, remaining: i64, minor_units: u32) -> Money {
    let n = remaining.max(1) as u32;
    let monthly_rate = annual_rate_pct / dec!(100) / dec!(12);
    if monthly_rate.is_zero() {
        return round_money(balance / Decimal::from(n), minor_units);
    }
    let denom = Decimal::ONE - iterative_pow_recip(Decimal::ONE + monthly_rate, n);
    if denom.is_zero() {
        return round_money(balance / Decimal::from(n), minor_units);
    }
    round_money(balance * monthly_rate / denom, minor_units)
}

/// Compute base^n for a positive integer exponent via iterative multiplication.
fn iterative_pow(base: Decimal, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result *= base;
    }
    result
}

/// Compute 1 / base^n.
fn iterative_pow_recip(base: Decimal, n: u32) -> Decimal {
    let pow = iterative_pow(base, n);
    if pow.is_zero() {
        Decimal::ZERO
    } else {
        Decimal::ONE / pow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{ExtraOverlay, InterestOverride, LumpSum, OverrideMode};
    use crate::types::{Currency, Mortgage, Payment, PaymentKind, TermsSnapshot};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn key(s: &str) -> PeriodKey {
        s.parse().unwrap()
    }

    fn standard_records() -> MortgageRecords {
        MortgageRecords {
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
        }
    }

    fn extra_scenario(monthly: Money) -> Scenario {
        Scenario {
            interest: None,
            extra: Some(ExtraOverlay {
                monthly_extra: Some(monthly),
                from_period_key: None,
                lump_sums: vec![],
            }),
        }
    }

    // -----------------------------------------------------------------------
    // 1. First-month interest follows the day-count formula
    // -----------------------------------------------------------------------
    #[test]
    fn test_first_month_interest() {
        let rows = generate(&standard_records(), key("2026-01"), 12, None).unwrap();
        // 2,000,000 * 0.05 * 31/365 = 8493.15
        assert_eq!(rows[0].interest, dec!(8493.15));
        assert_eq!(rows[0].days, 31);
        assert_eq!(rows[0].day_basis, 365);
        assert_eq!(rows[0].balance_start, dec!(2000000));
    }

    // -----------------------------------------------------------------------
    // 2. Balance chaining across consecutive rows
    // -----------------------------------------------------------------------
    #[test]
    fn test_balance_chaining() {
        let rows = generate(&standard_records(), key("2026-01"), 60, None).unwrap();
        assert_eq!(rows.len(), 60);
        for pair in rows.windows(2) {
            assert_eq!(pair[0].balance_end, pair[1].balance_start);
        }
    }

    // -----------------------------------------------------------------------
    // 3. Periods are contiguous, one per calendar month
    // -----------------------------------------------------------------------
    #[test]
    fn test_periods_contiguous() {
        let rows = generate(&standard_records(), key("2026-11"), 4, None).unwrap();
        let keys: Vec<String> = rows.iter().map(|r| r.period.to_string()).collect();
        assert_eq!(keys, vec!["2026-11", "2026-12", "2027-01", "2027-02"]);
    }

    // -----------------------------------------------------------------------
    // 4. The full requested horizon is emitted, zeros past payoff
    // -----------------------------------------------------------------------
    #[test]
    fn test_zero_rows_after_payoff_fill_horizon() {
        let mut records = standard_records();
        records.mortgage.principal = dec!(1000);
        records.mortgage.term_months = 10;
        let rows = generate(&records, key("2026-01"), 24, None).unwrap();
        assert_eq!(rows.len(), 24);

        let payoff = rows
            .iter()
            .position(|r| r.balance_end.is_zero())
            .expect("loan should pay off within the horizon");
        assert!(payoff < 12);
        for row in &rows[payoff + 1..] {
            assert_eq!(row.balance_start, Money::ZERO);
            assert_eq!(row.balance_end, Money::ZERO);
            assert_eq!(row.interest, Money::ZERO);
            assert_eq!(row.principal, Money::ZERO);
            assert_eq!(row.extra_principal, Money::ZERO);
            assert_eq!(row.payment_total, Money::ZERO);
        }
    }

    // -----------------------------------------------------------------------
    // 5. Determinism and idempotence
    // -----------------------------------------------------------------------
    #[test]
    fn test_generate_is_deterministic() {
        let records = standard_records();
        let scenario = extra_scenario(dec!(5000));
        let a = generate(&records, key("2026-01"), 120, Some(&scenario)).unwrap();
        let b = generate(&records, key("2026-01"), 120, Some(&scenario)).unwrap();
        assert_eq!(a, b);
    }

    // -----------------------------------------------------------------------
    // 6. Monthly extra lowers the balance by exactly its amount
    // -----------------------------------------------------------------------
    #[test]
    fn test_monthly_extra_first_row() {
        let records = standard_records();
        let baseline = generate(&records, key("2026-01"), 12, None).unwrap();
        let scenario_rows =
            generate(&records, key("2026-01"), 12, Some(&extra_scenario(dec!(5000)))).unwrap();

        assert_eq!(scenario_rows[0].extra_principal, dec!(5000));
        assert_eq!(
            scenario_rows[0].balance_end,
            baseline[0].balance_end - dec!(5000)
        );
        // The regular installment itself is unchanged by extra payments.
        assert_eq!(scenario_rows[0].payment_total, baseline[0].payment_total);
    }

    // -----------------------------------------------------------------------
    // 7. Lump sums land in their exact period
    // -----------------------------------------------------------------------
    #[test]
    fn test_lump_sum_applies_in_its_period() {
        let records = standard_records();
        let scenario = Scenario {
            interest: None,
            extra: Some(ExtraOverlay {
                monthly_extra: None,
                from_period_key: None,
                lump_sums: vec![LumpSum {
                    period_key: "2026-06".into(),
                    amount: dec!(100000),
                }],
            }),
        };
        let rows = generate(&records, key("2026-01"), 12, Some(&scenario)).unwrap();
        assert_eq!(rows[5].period, key("2026-06"));
        assert_eq!(rows[5].extra_principal, dec!(100000));
        assert_eq!(rows[4].extra_principal, Money::ZERO);
        assert_eq!(rows[6].extra_principal, Money::ZERO);
    }

    // -----------------------------------------------------------------------
    // 8. A malformed lump-sum key rejects the whole generation
    // -----------------------------------------------------------------------
    #[test]
    fn test_bad_scenario_key_aborts_generation() {
        let scenario = Scenario {
            interest: None,
            extra: Some(ExtraOverlay {
                monthly_extra: Some(dec!(500)),
                from_period_key: None,
                lump_sums: vec![LumpSum {
                    period_key: "2027-13".into(),
                    amount: dec!(1),
                }],
            }),
        };
        let result = generate(&standard_records(), key("2026-01"), 12, Some(&scenario));
        assert!(matches!(
            result,
            Err(MortgageError::InvalidPeriodKey { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // 9. Horizon start balance equals the prior period's closing balance
    // -----------------------------------------------------------------------
    #[test]
    fn test_pre_roll_balance_matches_full_run() {
        let records = standard_records();
        let from_origination = generate(&records, key("2026-01"), 3, None).unwrap();
        let offset = generate(&records, key("2026-03"), 1, None).unwrap();
        assert_eq!(offset[0].balance_start, from_origination[1].balance_end);
        assert_eq!(offset[0], from_origination[2]);
    }

    // -----------------------------------------------------------------------
    // 10. Recorded extra payments shape the baseline
    // -----------------------------------------------------------------------
    #[test]
    fn test_recorded_extras_reduce_baseline_balance() {
        let mut records = standard_records();
        records.payments.push(Payment {
            period: key("2026-02"),
            kind: PaymentKind::Extra,
            amount: dec!(50000),
            applied_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
        });

        let rows = generate(&records, key("2026-01"), 3, None).unwrap();
        assert_eq!(rows[1].extra_principal, dec!(50000));

        // The pre-roll sees the same recorded payment.
        let later = generate(&records, key("2026-03"), 1, None).unwrap();
        assert_eq!(later[0].balance_start, rows[2].balance_start);
    }

    // -----------------------------------------------------------------------
    // 11. An interest-only scenario keeps the recorded extra source
    // -----------------------------------------------------------------------
    #[test]
    fn test_interest_scenario_keeps_recorded_extras() {
        let mut records = standard_records();
        records.payments.push(Payment {
            period: key("2026-02"),
            kind: PaymentKind::Extra,
            amount: dec!(10000),
            applied_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
        });
        let scenario = Scenario {
            interest: Some(InterestOverride {
                mode: OverrideMode::Override,
                annual_rate_pct: dec!(4.0),
                from_period_key: None,
            }),
            extra: None,
        };
        let rows = generate(&records, key("2026-01"), 3, Some(&scenario)).unwrap();
        assert_eq!(rows[0].nominal_rate_pct, dec!(4.0));
        assert_eq!(rows[1].extra_principal, dec!(10000));
    }

    // -----------------------------------------------------------------------
    // 12. A terms change re-levels the installment
    // -----------------------------------------------------------------------
    #[test]
    fn test_terms_change_recomputes_installment() {
        let mut records = standard_records();
        records.terms.push(TermsSnapshot {
            effective_from: key("2026-07"),
            annual_rate_pct: dec!(3.0),
            fee: dec!(0),
            day_basis: 365,
        });
        let rows = generate(&records, key("2026-01"), 12, None).unwrap();

        assert_eq!(rows[5].nominal_rate_pct, dec!(5.0));
        assert_eq!(rows[6].nominal_rate_pct, dec!(3.0));
        // Lower rate, re-leveled annuity: the installment drops.
        assert!(rows[6].payment_total < rows[5].payment_total);
        // 30 days in June at 5%, 31 days in July at 3%.
        assert_eq!(rows[5].days, 30);
        assert_eq!(rows[6].days, 31);
    }

    // -----------------------------------------------------------------------
    // 13. Zero-rate loans amortize straight-line
    // -----------------------------------------------------------------------
    #[test]
    fn test_zero_rate_straight_line() {
        let mut records = standard_records();
        records.mortgage.principal = dec!(120000);
        records.mortgage.term_months = 120;
        records.terms[0].annual_rate_pct = dec!(0);

        let rows = generate(&records, key("2026-01"), 12, None).unwrap();
        assert_eq!(rows[0].interest, Money::ZERO);
        assert_eq!(rows[0].principal, dec!(1000));
        assert_eq!(rows[0].payment_total, dec!(1000));
    }

    // -----------------------------------------------------------------------
    // 14. Fees ride on top of the installment
    // -----------------------------------------------------------------------
    #[test]
    fn test_fee_included_in_payment_total() {
        let mut records = standard_records();
        records.terms[0].fee = dec!(25);
        let rows = generate(&records, key("2026-01"), 2, None).unwrap();
        assert_eq!(rows[0].fee, dec!(25));
        assert_eq!(
            rows[0].payment_total,
            rows[0].interest + rows[0].fee + rows[0].principal
        );
    }

    // -----------------------------------------------------------------------
    // 15. Clamp order at payoff: regular principal first
    // -----------------------------------------------------------------------
    #[test]
    fn test_clamp_regular_first() {
        let mut records = standard_records();
        records.mortgage.principal = dec!(1000);
        records.mortgage.term_months = 10;
        records.terms[0].annual_rate_pct = dec!(0);

        let rows = generate(
            &records,
            key("2026-01"),
            1,
            Some(&extra_scenario(dec!(950))),
        )
        .unwrap();
        // Scheduled principal 100 + extra 950 overshoots the 1000 balance.
        assert_eq!(rows[0].principal, dec!(100));
        assert_eq!(rows[0].extra_principal, dec!(900));
        assert_eq!(rows[0].balance_end, Money::ZERO);
    }

    // -----------------------------------------------------------------------
    // 16. Clamp order at payoff: proportional
    // -----------------------------------------------------------------------
    #[test]
    fn test_clamp_proportional() {
        let mut records = standard_records();
        records.mortgage.principal = dec!(1000);
        records.mortgage.term_months = 10;
        records.terms[0].annual_rate_pct = dec!(0);

        let config = ScheduleConfig {
            clamp_order: ClampOrder::Proportional,
        };
        let rows = generate_with_config(
            &records,
            key("2026-01"),
            1,
            Some(&extra_scenario(dec!(900))),
            &config,
        )
        .unwrap();
        // Reduction 1000 exactly matches the balance; nothing is cut.
        assert_eq!(rows[0].principal, dec!(100));
        assert_eq!(rows[0].extra_principal, dec!(900));

        let rows = generate_with_config(
            &records,
            key("2026-01"),
            1,
            Some(&extra_scenario(dec!(1900))),
            &config,
        )
        .unwrap();
        // reduction 2000 against a 1000 balance: both halved.
        assert_eq!(rows[0].principal, dec!(50));
        assert_eq!(rows[0].extra_principal, dec!(950));
        assert_eq!(rows[0].balance_end, Money::ZERO);
    }

    // -----------------------------------------------------------------------
    // 17. Fail fast on bad windows
    // -----------------------------------------------------------------------
    #[test]
    fn test_zero_months_rejected() {
        let result = generate(&standard_records(), key("2026-01"), 0, None);
        assert!(matches!(result, Err(MortgageError::InvalidInput { .. })));
    }

    #[test]
    fn test_horizon_before_origination_rejected() {
        let result = generate(&standard_records(), key("2025-12"), 12, None);
        assert!(matches!(result, Err(MortgageError::InvalidInput { .. })));
    }

    // -----------------------------------------------------------------------
    // 18. Missing originating snapshot aborts with NoTermsForPeriod
    // -----------------------------------------------------------------------
    #[test]
    fn test_terms_gap_aborts() {
        let mut records = standard_records();
        records.terms[0].effective_from = key("2026-06");
        let result = generate(&records, key("2026-01"), 12, None);
        assert!(matches!(
            result,
            Err(MortgageError::NoTermsForPeriod { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // 19. The balance never goes negative, whatever the overlay
    // -----------------------------------------------------------------------
    #[test]
    fn test_balance_never_negative() {
        let records = standard_records();
        let scenario = extra_scenario(dec!(250000));
        let rows = generate(&records, key("2026-01"), 24, Some(&scenario)).unwrap();
        for row in &rows {
            assert!(row.balance_end >= Money::ZERO, "{}", row.period);
            assert!(row.principal >= Money::ZERO, "{}", row.period);
            assert!(row.extra_principal >= Money::ZERO, "{}", row.period);
        }
        assert!(rows.last().unwrap().balance_end.is_zero());
    }

    // -----------------------------------------------------------------------
    // 20. Level installment across uneventful periods
    // -----------------------------------------------------------------------
    #[test]
    fn test_installment_constant_without_rate_changes() {
        let rows = generate(&standard_records(), key("2026-01"), 24, None).unwrap();
        let first = rows[0].payment_total;
        for row in &rows {
            assert_eq!(row.payment_total, first, "{}", row.period);
        }
    }
}
