//! Payout ledger: where schedules live once issued
//!
//! The calculator never stores anything. Callers keep schedules in a
//! [`PayoutLedger`], which enforces the rules around recording payments:
//!
//! - a period is settled at most once, so a second completion for the same
//!   `(plan, period)` is rejected
//! - a completed payout on the same date and for the same amount as an
//!   existing one is treated as a likely double entry and needs an explicit
//!   override
//! - principal changes go through the calculator so settled history is kept

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PayoutScheduleEntry;
use crate::calculator::{PayoutSchedule, RecalculationOutcome, ReturnCalculator};
use crate::error::LedgerError;
use crate::plan::PlanId;

/// A payment an administrator wants to record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub plan_id: PlanId,
    pub period_index: u32,
    pub paid_on: NaiveDate,

    /// Record even if it looks like a duplicate of an existing payout
    #[serde(default)]
    pub allow_duplicate: bool,
}

impl PaymentRecord {
    pub fn new(plan_id: PlanId, period_index: u32, paid_on: NaiveDate) -> Self {
        Self {
            plan_id,
            period_index,
            paid_on,
            allow_duplicate: false,
        }
    }

    /// Confirm a payment flagged as a possible duplicate
    pub fn confirmed(mut self) -> Self {
        self.allow_duplicate = true;
        self
    }
}

/// Storage for issued schedules
///
/// Implementors provide keyed access; payment recording and repricing are
/// provided on top so every store applies the same rules.
pub trait PayoutLedger {
    /// Store a newly issued schedule
    fn insert_schedule(&mut self, schedule: PayoutSchedule) -> Result<(), LedgerError>;

    fn schedule(&self, plan_id: PlanId) -> Option<&PayoutSchedule>;

    fn schedule_mut(&mut self, plan_id: PlanId) -> Option<&mut PayoutSchedule>;

    /// Mark a period completed
    fn record_payment(&mut self, payment: &PaymentRecord) -> Result<&PayoutScheduleEntry, LedgerError> {
        let schedule = self
            .schedule_mut(payment.plan_id)
            .ok_or(LedgerError::UnknownPlan(payment.plan_id))?;

        let amount = settleable_entry(schedule, payment.plan_id, payment.period_index)?.total_amount();

        if !payment.allow_duplicate {
            if let Some(existing) = find_duplicate(schedule, payment.paid_on, amount) {
                log::warn!(
                    "plan {}: payout of {} on {} matches period {}; confirmation required",
                    payment.plan_id,
                    amount,
                    payment.paid_on,
                    existing
                );
                return Err(LedgerError::PossibleDuplicate {
                    plan_id: payment.plan_id,
                    paid_on: payment.paid_on,
                    amount,
                    existing_period: existing,
                });
            }
        }

        let entry = settleable_entry_mut(schedule, payment.plan_id, payment.period_index)?;
        entry.mark_completed(payment.paid_on)?;
        log::info!(
            "plan {}: period {} paid {} on {}",
            payment.plan_id,
            payment.period_index,
            entry.total_amount(),
            payment.paid_on
        );
        Ok(&*entry)
    }

    /// Mark a period failed
    fn record_failure(
        &mut self,
        plan_id: PlanId,
        period_index: u32,
        reason: &str,
    ) -> Result<&PayoutScheduleEntry, LedgerError> {
        let schedule = self.schedule_mut(plan_id).ok_or(LedgerError::UnknownPlan(plan_id))?;
        let entry = settleable_entry_mut(schedule, plan_id, period_index)?;
        entry.mark_failed(reason)?;
        log::warn!("plan {}: period {} failed: {}", plan_id, period_index, reason);
        Ok(&*entry)
    }

    /// Apply an administrator's principal edit to a stored schedule
    fn change_principal(
        &mut self,
        calculator: &ReturnCalculator,
        plan_id: PlanId,
        new_principal: Decimal,
    ) -> Result<RecalculationOutcome, LedgerError> {
        let schedule = self.schedule_mut(plan_id).ok_or(LedgerError::UnknownPlan(plan_id))?;
        Ok(calculator.recalculate_on_principal_change(schedule, new_principal)?)
    }
}

fn settleable_entry(
    schedule: &PayoutSchedule,
    plan_id: PlanId,
    period_index: u32,
) -> Result<&PayoutScheduleEntry, LedgerError> {
    let entry = schedule
        .entry(period_index)
        .ok_or(LedgerError::UnknownPeriod { plan_id, period_index })?;
    if !entry.is_pending() {
        return Err(LedgerError::AlreadySettled {
            plan_id,
            period_index,
            status: entry.status(),
        });
    }
    Ok(entry)
}

fn settleable_entry_mut(
    schedule: &mut PayoutSchedule,
    plan_id: PlanId,
    period_index: u32,
) -> Result<&mut PayoutScheduleEntry, LedgerError> {
    settleable_entry(schedule, plan_id, period_index)?;
    schedule
        .entry_mut(period_index)
        .ok_or(LedgerError::UnknownPeriod { plan_id, period_index })
}

/// Period of a completed payout with the same date and amount
fn find_duplicate(schedule: &PayoutSchedule, paid_on: NaiveDate, amount: Decimal) -> Option<u32> {
    schedule
        .entries()
        .iter()
        .find(|e| e.paid_on() == Some(paid_on) && e.total_amount() == amount)
        .map(|e| e.period_index())
}

/// In-process ledger keyed by plan id
///
/// Constructed explicitly by whoever owns the process lifecycle and passed to
/// the code that needs it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    schedules: BTreeMap<PlanId, PayoutSchedule>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }

    /// All schedules ordered by plan id
    pub fn schedules(&self) -> impl Iterator<Item = &PayoutSchedule> {
        self.schedules.values()
    }
}

impl PayoutLedger for InMemoryLedger {
    fn insert_schedule(&mut self, schedule: PayoutSchedule) -> Result<(), LedgerError> {
        let plan_id = schedule.plan().plan_id;
        if self.schedules.contains_key(&plan_id) {
            return Err(LedgerError::ScheduleExists(plan_id));
        }
        self.schedules.insert(plan_id, schedule);
        Ok(())
    }

    fn schedule(&self, plan_id: PlanId) -> Option<&PayoutSchedule> {
        self.schedules.get(&plan_id)
    }

    fn schedule_mut(&mut self, plan_id: PlanId) -> Option<&mut PayoutSchedule> {
        self.schedules.get_mut(&plan_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalculatorError;
    use crate::payout::PayoutStatus;
    use crate::plan::{InvestmentPlan, PayoutFrequency};
    use rust_decimal_macros::dec;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger_with_plan(plan_id: PlanId) -> InMemoryLedger {
        let plan = InvestmentPlan::new(plan_id, dec!(1400000), PayoutFrequency::Monthly, ymd(2024, 1, 15)).unwrap();
        let schedule = ReturnCalculator::default().compute_schedule(&plan).unwrap();
        let mut ledger = InMemoryLedger::new();
        ledger.insert_schedule(schedule).unwrap();
        ledger
    }

    #[test]
    fn test_record_payment() {
        let mut ledger = ledger_with_plan(1);
        let entry = ledger.record_payment(&PaymentRecord::new(1, 1, ymd(2024, 2, 15))).unwrap();
        assert_eq!(entry.status(), PayoutStatus::Completed);
        assert_eq!(entry.paid_on(), Some(ymd(2024, 2, 15)));

        let schedule = ledger.schedule(1).unwrap();
        assert_eq!(schedule.next_payout_date(), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn test_second_completion_for_same_period_is_rejected() {
        let mut ledger = ledger_with_plan(1);
        ledger.record_payment(&PaymentRecord::new(1, 3, ymd(2024, 4, 15))).unwrap();

        let err = ledger
            .record_payment(&PaymentRecord::new(1, 3, ymd(2024, 4, 16)).confirmed())
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::AlreadySettled {
                plan_id: 1,
                period_index: 3,
                status: PayoutStatus::Completed,
            }
        );
        assert_eq!(ledger.schedule(1).unwrap().entry(3).unwrap().paid_on(), Some(ymd(2024, 4, 15)));
    }

    #[test]
    fn test_same_day_same_amount_needs_confirmation() {
        let mut ledger = ledger_with_plan(1);
        ledger.record_payment(&PaymentRecord::new(1, 1, ymd(2024, 2, 15))).unwrap();

        let err = ledger
            .record_payment(&PaymentRecord::new(1, 2, ymd(2024, 2, 15)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::PossibleDuplicate { existing_period: 1, .. }));
        assert!(ledger.schedule(1).unwrap().entry(2).unwrap().is_pending());

        let entry = ledger
            .record_payment(&PaymentRecord::new(1, 2, ymd(2024, 2, 15)).confirmed())
            .unwrap();
        assert_eq!(entry.status(), PayoutStatus::Completed);
    }

    #[test]
    fn test_failure_is_terminal() {
        let mut ledger = ledger_with_plan(1);
        ledger.record_failure(1, 1, "bank rejected transfer").unwrap();

        let err = ledger.record_payment(&PaymentRecord::new(1, 1, ymd(2024, 2, 20))).unwrap_err();
        assert!(matches!(err, LedgerError::AlreadySettled { status: PayoutStatus::Failed, .. }));
    }

    #[test]
    fn test_unknown_plan_and_period() {
        let mut ledger = ledger_with_plan(1);
        assert_eq!(
            ledger.record_payment(&PaymentRecord::new(2, 1, ymd(2024, 2, 15))).unwrap_err(),
            LedgerError::UnknownPlan(2)
        );
        assert_eq!(
            ledger.record_failure(1, 13, "n/a").unwrap_err(),
            LedgerError::UnknownPeriod { plan_id: 1, period_index: 13 }
        );
    }

    #[test]
    fn test_duplicate_schedule_rejected() {
        let mut ledger = ledger_with_plan(1);
        let schedule = ledger.schedule(1).unwrap().clone();
        assert_eq!(ledger.insert_schedule(schedule), Err(LedgerError::ScheduleExists(1)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_change_principal_preserves_history() {
        let mut ledger = ledger_with_plan(1);
        let calc = ReturnCalculator::default();
        for period in 1..=5 {
            let due = ledger.schedule(1).unwrap().entry(period).unwrap().due_date();
            ledger.record_payment(&PaymentRecord::new(1, period, due)).unwrap();
        }

        let outcome = ledger.change_principal(&calc, 1, dec!(1000000)).unwrap();
        assert_eq!(outcome.preserved_history, 5);
        assert_eq!(outcome.updated_pending, 7);

        let schedule = ledger.schedule(1).unwrap();
        assert_eq!(schedule.entry(5).unwrap().total_amount(), dec!(145833.34));
        assert_eq!(schedule.entry(6).unwrap().total_amount(), dec!(104166.66));

        assert!(matches!(
            ledger.change_principal(&calc, 1, dec!(0)),
            Err(LedgerError::Calculator(CalculatorError::InvalidPrincipal(_)))
        ));
    }
}
