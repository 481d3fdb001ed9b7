//! Core return calculator: periodic payout breakdowns

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::terms::{round2, RemainderPolicy, ReturnTerms};
use crate::error::CalculatorError;
use crate::payout::PayoutScheduleEntry;
use crate::plan::{validate_principal, InvestmentPlan, PayoutFrequency};

/// Per-period split of a plan's payout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutBreakdown {
    /// Rounded profit paid each period
    pub interest_per_period: Decimal,

    /// Rounded principal returned each period
    pub principal_per_period: Decimal,

    /// interest_per_period + principal_per_period
    pub total_per_period: Decimal,

    /// 52 weekly or 12 monthly
    pub periods: u32,

    /// Principal plus profit, unrounded
    pub total_payout: Decimal,

    /// Profit over the term, unrounded
    pub total_profit: Decimal,
}

impl PayoutBreakdown {
    /// Principal the breakdown was computed from
    pub fn principal(&self) -> Decimal {
        self.total_payout - self.total_profit
    }

    /// Sum of all periodic payments when every period pays the same amount
    pub fn scheduled_total(&self) -> Decimal {
        self.total_per_period * Decimal::from(self.periods)
    }

    /// Cents lost (positive) or gained (negative) to per-period rounding
    pub fn rounding_drift(&self) -> Decimal {
        round2(self.total_payout) - self.scheduled_total()
    }

    /// (interest, principal) for the last period when it absorbs the drift
    ///
    /// None when the earlier periods already pay more than the rounded total,
    /// which happens for principals of a few cents.
    fn final_period_portions(&self) -> Option<(Decimal, Decimal)> {
        let earlier = Decimal::from(self.periods - 1);
        let interest = round2(self.total_profit) - self.interest_per_period * earlier;
        let principal = round2(self.principal()) - self.principal_per_period * earlier;
        if interest < Decimal::ZERO || principal < Decimal::ZERO {
            return None;
        }
        Some((interest, principal))
    }
}

/// Stateless payout engine; safe to share across threads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReturnCalculator {
    terms: ReturnTerms,
}

impl ReturnCalculator {
    /// Create a calculator with the given terms
    pub fn new(terms: ReturnTerms) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &ReturnTerms {
        &self.terms
    }

    /// Split a principal into equal per-period payouts over the term
    pub fn compute_periodic_payout(
        &self,
        principal: Decimal,
        frequency: PayoutFrequency,
    ) -> Result<PayoutBreakdown, CalculatorError> {
        let principal = validate_principal(principal)?;

        let (total_profit, total_payout) = principal
            .checked_mul(self.terms.profit_rate)
            .and_then(|profit| principal.checked_add(profit).map(|payout| (profit, payout)))
            .ok_or_else(|| {
                CalculatorError::InvalidPrincipal(format!("{} exceeds the supported range", principal))
            })?;
        let periods = frequency.periods();
        let divisor = Decimal::from(periods);

        let interest_per_period = round2(total_profit / divisor);
        let principal_per_period = round2(principal / divisor);
        let total_per_period = round2(interest_per_period + principal_per_period);

        // Rounded-up periods must still sum within range
        if total_per_period.checked_mul(divisor).is_none() {
            return Err(CalculatorError::InvalidPrincipal(format!(
                "{} exceeds the supported range",
                principal
            )));
        }

        let breakdown = PayoutBreakdown {
            interest_per_period,
            principal_per_period,
            total_per_period,
            periods,
            total_payout,
            total_profit,
        };

        log::debug!(
            "{} payout for {}: {} x {} (drift {})",
            frequency,
            principal,
            periods,
            total_per_period,
            breakdown.rounding_drift()
        );

        Ok(breakdown)
    }

    /// Same as [`compute_periodic_payout`](Self::compute_periodic_payout) for
    /// unparsed form input
    pub fn compute_periodic_payout_raw(
        &self,
        principal: &str,
        frequency: &str,
    ) -> Result<PayoutBreakdown, CalculatorError> {
        let principal = crate::plan::parse_principal(principal)?;
        self.compute_periodic_payout(principal, frequency.parse()?)
    }

    /// Generate a single schedule entry without building the whole schedule
    pub fn entry_for_period(
        &self,
        plan: &InvestmentPlan,
        period_index: u32,
    ) -> Result<PayoutScheduleEntry, CalculatorError> {
        let breakdown = self.compute_periodic_payout(plan.principal, plan.payout_frequency)?;
        self.build_entry(plan, &breakdown, period_index)
    }

    pub(crate) fn build_entry(
        &self,
        plan: &InvestmentPlan,
        breakdown: &PayoutBreakdown,
        period_index: u32,
    ) -> Result<PayoutScheduleEntry, CalculatorError> {
        if period_index == 0 || period_index > breakdown.periods {
            return Err(CalculatorError::InvalidPeriod {
                index: period_index,
                periods: breakdown.periods,
            });
        }

        let due_date = super::schedule::due_date(plan.start_date, plan.payout_frequency, period_index)?;
        let (interest, principal) = self.portions_for(breakdown, period_index);

        Ok(PayoutScheduleEntry::new(
            plan.plan_id,
            period_index,
            interest,
            principal,
            due_date,
        ))
    }

    /// (interest, principal) owed for a period under the configured remainder policy
    pub(crate) fn portions_for(&self, breakdown: &PayoutBreakdown, period_index: u32) -> (Decimal, Decimal) {
        let regular = (breakdown.interest_per_period, breakdown.principal_per_period);
        match self.terms.remainder {
            RemainderPolicy::FinalPeriod if period_index == breakdown.periods => {
                breakdown.final_period_portions().unwrap_or_else(|| {
                    log::warn!(
                        "drift of {} on principal {} cannot be absorbed by the final period; keeping per-period amounts",
                        breakdown.rounding_drift(),
                        breakdown.principal()
                    );
                    regular
                })
            }
            _ => regular,
        }
    }
}

/// Breakdown under the standard 25% terms
pub fn compute_periodic_payout(
    principal: Decimal,
    frequency: PayoutFrequency,
) -> Result<PayoutBreakdown, CalculatorError> {
    ReturnCalculator::default().compute_periodic_payout(principal, frequency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_breakdown() {
        let b = compute_periodic_payout(dec!(1400000), PayoutFrequency::Monthly).unwrap();
        assert_eq!(b.interest_per_period, dec!(29166.67));
        assert_eq!(b.principal_per_period, dec!(116666.67));
        assert_eq!(b.total_per_period, dec!(145833.34));
        assert_eq!(b.periods, 12);
        assert_eq!(b.total_payout, dec!(1750000));
        assert_eq!(b.principal(), dec!(1400000));
    }

    #[test]
    fn test_weekly_breakdown() {
        let b = compute_periodic_payout(dec!(1400000), PayoutFrequency::Weekly).unwrap();
        assert_eq!(b.interest_per_period, dec!(6730.77));
        assert_eq!(b.principal_per_period, dec!(26923.08));
        assert_eq!(b.total_per_period, dec!(33653.85));
        assert_eq!(b.periods, 52);
        assert_eq!(b.total_payout, dec!(1750000));
    }

    #[test]
    fn test_total_payout_is_exact() {
        for principal in [dec!(1), dec!(999.99), dec!(12345.67), dec!(1400000), dec!(7777777.77)] {
            for freq in [PayoutFrequency::Monthly, PayoutFrequency::Weekly] {
                let b = compute_periodic_payout(principal, freq).unwrap();
                assert_eq!(b.total_payout, principal * dec!(1.25));
                assert_eq!(b.interest_per_period + b.principal_per_period, b.total_per_period);
            }
        }
    }

    #[test]
    fn test_rounding_drift_is_reported() {
        // 12 x 145833.34 = 1750000.08
        let b = compute_periodic_payout(dec!(1400000), PayoutFrequency::Monthly).unwrap();
        assert_eq!(b.scheduled_total(), dec!(1750000.08));
        assert_eq!(b.rounding_drift(), dec!(-0.08));

        // 52 x 33653.85 = 1750000.20
        let b = compute_periodic_payout(dec!(1400000), PayoutFrequency::Weekly).unwrap();
        assert_eq!(b.rounding_drift(), dec!(-0.20));
    }

    #[test]
    fn test_invalid_principal() {
        assert!(matches!(
            compute_periodic_payout(dec!(0), PayoutFrequency::Monthly),
            Err(CalculatorError::InvalidPrincipal(_))
        ));
        assert!(matches!(
            compute_periodic_payout(dec!(-500), PayoutFrequency::Weekly),
            Err(CalculatorError::InvalidPrincipal(_))
        ));
    }

    #[test]
    fn test_principal_out_of_range() {
        let max = crate::plan::parse_principal("79228162514264337593543950335").unwrap();
        assert_eq!(max, Decimal::MAX);
        for freq in [PayoutFrequency::Monthly, PayoutFrequency::Weekly] {
            assert!(matches!(
                compute_periodic_payout(max, freq),
                Err(CalculatorError::InvalidPrincipal(_))
            ));
        }

        let calc = ReturnCalculator::new(ReturnTerms {
            profit_rate: dec!(1000),
            ..ReturnTerms::standard()
        });
        assert!(matches!(
            calc.compute_periodic_payout(Decimal::MAX / dec!(100), PayoutFrequency::Monthly),
            Err(CalculatorError::InvalidPrincipal(_))
        ));
    }

    #[test]
    fn test_final_period_never_negative() {
        use crate::calculator::RemainderPolicy;

        let calc = ReturnCalculator::new(ReturnTerms::standard().with_remainder(RemainderPolicy::FinalPeriod));
        let plan = InvestmentPlan::new(
            5,
            dec!(0.30),
            PayoutFrequency::Weekly,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .unwrap();

        let schedule = calc.compute_schedule(&plan).unwrap();
        let breakdown = *schedule.breakdown();
        assert_eq!(breakdown.principal_per_period, dec!(0.01));
        assert_eq!(breakdown.interest_per_period, dec!(0.00));

        for entry in schedule.entries() {
            assert!(entry.interest_portion() >= Decimal::ZERO);
            assert!(entry.principal_portion() >= Decimal::ZERO);
        }
        let last = schedule.entries().last().unwrap();
        assert_eq!(last.principal_portion(), dec!(0.01));
        assert_eq!(last.total_amount(), dec!(0.01));
    }

    #[test]
    fn test_raw_input() {
        let calc = ReturnCalculator::default();
        assert!(matches!(
            calc.compute_periodic_payout_raw("1000", "yearly"),
            Err(CalculatorError::InvalidFrequency(_))
        ));
        assert!(matches!(
            calc.compute_periodic_payout_raw("lots", "monthly"),
            Err(CalculatorError::InvalidPrincipal(_))
        ));
        let b = calc.compute_periodic_payout_raw("1,400,000", "Weekly").unwrap();
        assert_eq!(b.total_per_period, dec!(33653.85));
    }

    #[test]
    fn test_custom_profit_rate() {
        let calc = ReturnCalculator::new(ReturnTerms {
            profit_rate: dec!(0.10),
            ..ReturnTerms::standard()
        });
        let b = calc.compute_periodic_payout(dec!(1200), PayoutFrequency::Monthly).unwrap();
        assert_eq!(b.interest_per_period, dec!(10.00));
        assert_eq!(b.principal_per_period, dec!(100.00));
        assert_eq!(b.total_payout, dec!(1320));
    }

    #[test]
    fn test_entry_for_period() {
        let plan = InvestmentPlan::new(
            3,
            dec!(1400000),
            PayoutFrequency::Weekly,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .unwrap();
        let calc = ReturnCalculator::default();

        let entry = calc.entry_for_period(&plan, 2).unwrap();
        assert_eq!(entry.period_index(), 2);
        assert_eq!(entry.due_date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(entry.total_amount(), dec!(33653.85));

        assert_eq!(
            calc.entry_for_period(&plan, 53),
            Err(CalculatorError::InvalidPeriod { index: 53, periods: 52 })
        );
        assert!(calc.entry_for_period(&plan, 0).is_err());
    }
}
